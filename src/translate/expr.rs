use std::collections::HashMap;

use crate::ast::RawExpr;
use crate::error::{Result, TranslateError};
use crate::kind::{KindId, Lookup};
use crate::module::EnumField;
use crate::value::{BuiltinValue, Expr, Value, ValueId, ValueRegistry, parse_int_literal};

use super::TranslationContext;

/// Turn a raw initializer into a resolved expression.
///
/// Identifiers resolve against the value registry (scoped, and qualified by
/// the target enum when `kind` is one), then against the built-in float
/// sentinels. Anything else is an error: by the time an expression is fixed
/// up, every value it may legally name is registered.
pub(crate) fn fixup_expression(
    ctx: &TranslationContext,
    raw: &RawExpr,
    lookup: Lookup<'_>,
    kind: Option<KindId>,
) -> Result<Expr> {
    let name = match raw {
        RawExpr::Literal(text) => return Ok(Expr::Literal(text.clone())),
        RawExpr::Identifier(name) => name,
    };
    let enum_name = kind
        .filter(|k| ctx.kinds.is_enum(*k))
        .and_then(|k| ctx.kinds.user(k))
        .map(|u| u.qualified_name.as_str());
    if let Some(id) = ctx.values.lookup_scoped(name, lookup, enum_name)? {
        return Ok(Expr::Value(id));
    }
    if let Some(builtin) = BuiltinValue::from_name(name) {
        return Ok(Expr::Builtin(builtin));
    }
    Err(TranslateError::UnresolvedIdentifier { site: lookup.site.to_string(), name: name.clone() })
}

/// Give every field of one enum its final numeric value, left to right.
///
/// Unset follows the previous value (starting from -1), integer literals are
/// parsed, and references take the referenced enum value's number (an
/// earlier field of this enum, or a field of an enum resolved before this one).
pub(crate) fn resolve_numeric_enum_values(
    values: &mut ValueRegistry,
    enum_spec: &str,
    fields: &mut [EnumField],
    ids: &[ValueId],
) -> Result<()> {
    let unresolved = |field: &EnumField| TranslateError::UnresolvedEnumValue {
        enum_spec: enum_spec.to_string(),
        field: field.name.clone(),
    };

    let mut resolved: HashMap<ValueId, i64> = HashMap::new();
    let mut prev_value: i64 = -1;
    for (field, id) in fields.iter_mut().zip(ids) {
        prev_value = match &field.value {
            None => prev_value.checked_add(1).ok_or_else(|| unresolved(field))?,
            Some(Expr::Literal(text)) => {
                parse_int_literal(text).ok_or_else(|| TranslateError::InvalidEnumLiteral {
                    enum_spec: enum_spec.to_string(),
                    field: field.name.clone(),
                    literal: text.clone(),
                })?
            }
            Some(Expr::Value(target)) => match values.get(*target) {
                Value::Enum(v) => resolved
                    .get(target)
                    .copied()
                    .or(v.numeric_value)
                    .ok_or_else(|| unresolved(field))?,
                Value::Constant(_) => return Err(unresolved(field)),
            },
            Some(Expr::Builtin(_)) => return Err(unresolved(field)),
        };
        field.numeric_value = prev_value;
        resolved.insert(*id, prev_value);
        values.set_numeric_value(*id, prev_value);
    }
    Ok(())
}
