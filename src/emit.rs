//! JSON view of a translated module, for template layers and the CLI.
//!
//! Kinds are rendered as their canonical spec strings and values as their
//! qualified specs, so the output is stable across runs and readable without
//! the registries.
use serde_json::{Value as Json, json};

use crate::kind::KindId;
use crate::module::{Constant, Enum, Interface, Method, Module, Parameter, Struct, Union};
use crate::value::Expr;

pub fn emit_module(module: &Module) -> Json {
    json!({
        "name": module.name,
        "namespace": module.namespace,
        "attributes": module.attributes,
        "imports": module.imports.iter().map(|i| json!({
            "module": i.module_name,
            "namespace": i.namespace,
        })).collect::<Vec<_>>(),
        "enums": module.enums.iter().map(|e| emit_enum(module, e)).collect::<Vec<_>>(),
        "structs": module.structs.iter().map(|s| emit_struct(module, s)).collect::<Vec<_>>(),
        "unions": module.unions.iter().map(|u| emit_union(module, u)).collect::<Vec<_>>(),
        "interfaces": module.interfaces.iter().map(|x| emit_interface(module, x)).collect::<Vec<_>>(),
        "constants": module.constants.iter().map(|c| emit_constant(module, c)).collect::<Vec<_>>(),
    })
}

/// Registry listing: every canonical spec with its kind tag, and the import
/// it came from for imported user types.
pub fn emit_kinds(module: &Module) -> Json {
    let kinds = module
        .kinds
        .iter()
        .map(|(spec, id)| {
            let imported_from = module
                .kinds
                .user(id)
                .and_then(|u| u.imported_from)
                .map(|i| module.import(i).module_name.clone());
            json!({
                "spec": spec,
                "kind": module.kinds.get(id).tag(),
                "imported_from": imported_from,
            })
        })
        .collect::<Vec<_>>();
    json!({ "module": module.name, "kinds": kinds })
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn kind(module: &Module, id: KindId) -> Json {
    Json::from(module.kinds.spec(id))
}

fn expr(module: &Module, e: &Expr) -> Json {
    match e {
        Expr::Literal(text) => json!({ "literal": text }),
        Expr::Value(id) => {
            let value = module.values.get(*id);
            json!({ "value": value.spec(), "kind": value.tag() })
        }
        Expr::Builtin(b) => json!({ "builtin": b.name() }),
    }
}

fn emit_enum(module: &Module, e: &Enum) -> Json {
    json!({
        "name": e.name,
        "spec": e.spec,
        "native_only": e.native_only,
        "attributes": e.attributes,
        "fields": e.fields.iter().map(|f| json!({
            "name": f.name,
            "value": f.value.as_ref().map(|v| expr(module, v)),
            "numeric_value": f.numeric_value,
            "attributes": f.attributes,
        })).collect::<Vec<_>>(),
    })
}

fn emit_constant(module: &Module, c: &Constant) -> Json {
    json!({
        "name": c.name,
        "kind": kind(module, c.kind),
        "value": expr(module, &c.value),
        "attributes": c.attributes,
    })
}

fn emit_struct(module: &Module, s: &Struct) -> Json {
    json!({
        "name": s.name,
        "spec": s.spec,
        "native_only": s.native_only,
        "attributes": s.attributes,
        "enums": s.enums.iter().map(|e| emit_enum(module, e)).collect::<Vec<_>>(),
        "constants": s.constants.iter().map(|c| emit_constant(module, c)).collect::<Vec<_>>(),
        "fields": s.fields.iter().map(|f| json!({
            "name": f.name,
            "kind": kind(module, f.kind),
            "ordinal": f.ordinal,
            "default": f.default.as_ref().map(|d| expr(module, d)),
            "attributes": f.attributes,
        })).collect::<Vec<_>>(),
    })
}

fn emit_union(module: &Module, u: &Union) -> Json {
    json!({
        "name": u.name,
        "spec": u.spec,
        "attributes": u.attributes,
        "fields": u.fields.iter().map(|f| json!({
            "name": f.name,
            "kind": kind(module, f.kind),
            "ordinal": f.ordinal,
            "attributes": f.attributes,
        })).collect::<Vec<_>>(),
    })
}

fn emit_parameters(module: &Module, params: &[Parameter]) -> Json {
    params
        .iter()
        .map(|p| {
            json!({
                "name": p.name,
                "kind": kind(module, p.kind),
                "ordinal": p.ordinal,
                "attributes": p.attributes,
            })
        })
        .collect()
}

fn emit_method(module: &Module, m: &Method) -> Json {
    json!({
        "name": m.name,
        "ordinal": m.ordinal,
        "sync": m.is_sync(),
        "attributes": m.attributes,
        "parameters": emit_parameters(module, &m.parameters),
        "response_parameters": m.response_parameters.as_deref().map(|p| emit_parameters(module, p)),
    })
}

fn emit_interface(module: &Module, x: &Interface) -> Json {
    json!({
        "name": x.name,
        "spec": x.spec,
        "attributes": x.attributes,
        "enums": x.enums.iter().map(|e| emit_enum(module, e)).collect::<Vec<_>>(),
        "constants": x.constants.iter().map(|c| emit_constant(module, c)).collect::<Vec<_>>(),
        "methods": x.methods.iter().map(|m| emit_method(module, m)).collect::<Vec<_>>(),
    })
}

// ------------------------------- Tests ------------------------------------ //
