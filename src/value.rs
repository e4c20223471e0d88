//! Value registry: qualified names → enum values and constants.
//!
//! Specs look like `my.ns.Enum.FIELD`, `my.ns.Outer.Enum.FIELD` for enums
//! nested in a type, and `my.ns.[Outer.]kConstant` for constants.

use indexmap::IndexMap;

use crate::error::{Result, TranslateError};
use crate::kind::{KindId, Lookup, search_scopes};
use crate::module::ImportId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(u32);

impl ValueId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ————————————————————————————————————————————————————————————————————————————
// VALUES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinValue {
    DoubleInfinity,
    DoubleNegativeInfinity,
    DoubleNan,
    FloatInfinity,
    FloatNegativeInfinity,
    FloatNan,
}

const BUILTINS: &[(&str, BuiltinValue)] = &[
    ("double.INFINITY", BuiltinValue::DoubleInfinity),
    ("double.NEGATIVE_INFINITY", BuiltinValue::DoubleNegativeInfinity),
    ("double.NAN", BuiltinValue::DoubleNan),
    ("float.INFINITY", BuiltinValue::FloatInfinity),
    ("float.NEGATIVE_INFINITY", BuiltinValue::FloatNegativeInfinity),
    ("float.NAN", BuiltinValue::FloatNan),
];

impl BuiltinValue {
    pub fn from_name(name: &str) -> Option<Self> {
        BUILTINS.iter().find(|(n, _)| *n == name).map(|(_, b)| *b)
    }

    pub fn name(self) -> &'static str {
        BUILTINS.iter().find(|(_, b)| *b == self).map(|(n, _)| *n).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub namespace: String,
    pub parent_name: Option<String>,
    pub enum_name: String,
    pub field_name: String,
    pub enum_kind: KindId,
    /// Filled once the owning enum's fields are resolved.
    pub numeric_value: Option<i64>,
    pub imported_from: Option<ImportId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantValue {
    pub namespace: String,
    pub parent_name: Option<String>,
    pub name: String,
    pub kind: KindId,
    pub imported_from: Option<ImportId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Enum(EnumValue),
    Constant(ConstantValue),
}

fn join_spec<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts.into_iter().filter(|p| !p.is_empty()).collect::<Vec<_>>().join(".")
}

impl Value {
    pub fn spec(&self) -> String {
        match self {
            Value::Enum(v) => join_spec([
                v.namespace.as_str(),
                v.parent_name.as_deref().unwrap_or(""),
                v.enum_name.as_str(),
                v.field_name.as_str(),
            ]),
            Value::Constant(v) => join_spec([
                v.namespace.as_str(),
                v.parent_name.as_deref().unwrap_or(""),
                v.name.as_str(),
            ]),
        }
    }

    pub fn imported_from(&self) -> Option<ImportId> {
        match self {
            Value::Enum(v) => v.imported_from,
            Value::Constant(v) => v.imported_from,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Value::Enum(_) => "enum_value",
            Value::Constant(_) => "constant",
        }
    }
}

/// An expression after fixup: default values, enum initializers, constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Source text of a literal, e.g. `"0x10"`, `"1.5"`, `"\"hi\""`.
    Literal(String),
    Value(ValueId),
    Builtin(BuiltinValue),
}

/// Parse an integer literal the way mojom writes them: optional sign, then
/// decimal or `0x` hex.
pub fn parse_int_literal(text: &str) -> Option<i64> {
    let t = text.trim();
    let (negative, digits) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    // `from_str_radix` takes a sign of its own; only one is allowed, up front.
    let (radix, body) = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    if !body.chars().next().is_some_and(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = i128::from_str_radix(body, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

// ————————————————————————————————————————————————————————————————————————————
// REGISTRY
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default)]
pub struct ValueRegistry {
    entries: Vec<Value>,
    by_spec: IndexMap<String, ValueId>,
}

impl ValueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under `value.spec()`. Same shadowing policy as kinds: local
    /// beats imported, local twice is an error.
    pub fn register(&mut self, value: Value) -> Result<ValueId> {
        let spec = value.spec();
        if let Some(&id) = self.by_spec.get(&spec) {
            if self.entries[id.index()].imported_from().is_none() {
                return Err(TranslateError::DuplicateDefinition { spec });
            }
            if value.imported_from().is_none() {
                tracing::warn!(%spec, "local value shadows an imported one");
            }
            self.entries[id.index()] = value;
            return Ok(id);
        }
        let id = ValueId(self.entries.len() as u32);
        self.entries.push(value);
        self.by_spec.insert(spec, id);
        Ok(id)
    }

    pub fn get(&self, id: ValueId) -> &Value {
        &self.entries[id.index()]
    }

    pub fn lookup(&self, spec: &str) -> Option<ValueId> {
        self.by_spec.get(spec).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ValueId, &Value)> + '_ {
        self.by_spec.values().map(|id| (*id, &self.entries[id.index()]))
    }

    pub fn len(&self) -> usize {
        self.by_spec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_spec.is_empty()
    }

    pub(crate) fn set_numeric_value(&mut self, id: ValueId, numeric: i64) {
        if let Value::Enum(v) = &mut self.entries[id.index()] {
            v.numeric_value = Some(numeric);
        }
    }

    /// Scoped lookup of a value reference.
    ///
    /// When the reference initializes something of enum type, a bare
    /// `FIELD` first means `<Enum>.FIELD`; pass the enum's qualified name as
    /// `enum_name` for that. Constants of the enum's type are still found
    /// by their plain name.
    pub fn lookup_scoped(
        &self,
        name: &str,
        lookup: Lookup<'_>,
        enum_name: Option<&str>,
    ) -> Result<Option<ValueId>> {
        if let Some(qualifier) = enum_name.filter(|_| !name.contains('.')) {
            let field = format!("{qualifier}.{name}");
            if let Some(id) = self.search(&field, lookup)? {
                return Ok(Some(id));
            }
        }
        self.search(name, lookup)
    }

    fn search(&self, name: &str, lookup: Lookup<'_>) -> Result<Option<ValueId>> {
        search_scopes(lookup.scope.candidates(name), lookup.strict, |spec| self.lookup(spec)).map_err(
            |candidates| TranslateError::AmbiguousReference {
                site: lookup.site.to_string(),
                name: name.to_string(),
                candidates,
            },
        )
    }
}

// ------------------------------- Tests ------------------------------------ //
