use std::sync::Arc;

use crate::error::Result;
use crate::module::{Import, ImportId, Module};
use crate::value::Value;

use super::TranslationContext;

/// Make everything `imported` declares itself visible in the module being
/// built: its user kinds and its values, tagged with where they came from.
/// Things `imported` got from its own imports are not re-exported by name.
pub(crate) fn import_module(ctx: &mut TranslationContext, import_name: &str, imported: Arc<Module>) -> Result<()> {
    let import_id = ImportId(ctx.imports.len());
    let mut kind_count = 0usize;

    for (spec, id) in imported.kinds.iter() {
        let Some(user) = imported.kinds.user(id) else { continue };
        if user.imported_from.is_some() || user.spec() != spec {
            continue;
        }
        let mut copy = user.clone();
        copy.imported_from = Some(import_id);
        ctx.kinds.declare_user(copy)?;
        kind_count += 1;
    }

    let mut value_count = 0usize;

    for (_, value) in imported.values.iter() {
        if value.imported_from().is_some() {
            continue;
        }
        // Kind ids are per registry. A value may be typed by something
        // `imported` itself imported; that type comes along unkeyed.
        let copy = match value {
            Value::Enum(v) => {
                let mut v = v.clone();
                v.enum_kind = ctx.kinds.adopt(&imported.kinds, v.enum_kind, import_id);
                v.imported_from = Some(import_id);
                Value::Enum(v)
            }
            Value::Constant(v) => {
                let mut v = v.clone();
                v.kind = ctx.kinds.adopt(&imported.kinds, v.kind, import_id);
                v.imported_from = Some(import_id);
                Value::Constant(v)
            }
        };
        ctx.values.register(copy)?;
        value_count += 1;
    }

    tracing::debug!(import = import_name, kinds = kind_count, values = value_count, "imported module");
    ctx.imports.push(Import {
        module_name: import_name.to_string(),
        namespace: imported.namespace.clone(),
        module: imported,
    });
    Ok(())
}
