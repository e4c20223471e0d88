//! Strongly-typed input tree: one parsed mojom file.
//!
//! The upstream parser hands us nested JSON. Everything here is decoded and
//! validated once at the boundary (required keys, type-name grammar), so the
//! translator never pokes at loosely shaped maps.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::TranslateError;
use crate::kind::map_kind;

// ————————————————————————————————————————————————————————————————————————————
// ATTRIBUTES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl AttributeValue {
    /// Python-ish truthiness, which is how mojom treats `[Sync]`, `[Native]`, ...
    pub fn is_truthy(&self) -> bool {
        match self {
            AttributeValue::Bool(b) => *b,
            AttributeValue::Int(i) => *i != 0,
            AttributeValue::Str(s) => !s.is_empty(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            AttributeValue::Str(s) => s.parse().ok(),
            AttributeValue::Bool(_) => None,
        }
    }
}

pub type Attributes = IndexMap<String, AttributeValue>;

// ————————————————————————————————————————————————————————————————————————————
// TYPE NAMES & EXPRESSIONS
// ————————————————————————————————————————————————————————————————————————————

/// A type name as written in the source, paired with its canonical spec.
/// Grammar errors surface during decoding, with the JSON path attached.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct TypeName {
    pub raw: String,
    pub spec: String,
}

impl TryFrom<String> for TypeName {
    type Error = TranslateError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let spec = map_kind(&raw)?;
        Ok(TypeName { raw, spec })
    }
}

/// Unresolved expression: a literal (kept as source text) or a reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawExprRepr")]
pub enum RawExpr {
    Literal(String),
    Identifier(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExprRepr {
    Identifier { identifier: String },
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl From<RawExprRepr> for RawExpr {
    fn from(repr: RawExprRepr) -> Self {
        match repr {
            RawExprRepr::Identifier { identifier } => RawExpr::Identifier(identifier),
            RawExprRepr::Bool(b) => RawExpr::Literal(b.to_string()),
            RawExprRepr::Number(n) => RawExpr::Literal(n.to_string()),
            RawExprRepr::Text(s) => RawExpr::Literal(s),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct File {
    /// Module name other files import it by. Batch loading falls back to the file name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub enums: Vec<EnumDecl>,
    #[serde(default)]
    pub structs: Vec<StructDecl>,
    #[serde(default)]
    pub unions: Vec<UnionDecl>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceDecl>,
    #[serde(default)]
    pub constants: Vec<ConstDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDecl {
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
    /// `None` declares a native-only enum.
    #[serde(default)]
    pub values: Option<Vec<EnumValueDecl>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumValueDecl {
    pub name: String,
    #[serde(default)]
    pub value: Option<RawExpr>,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructDecl {
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub enums: Vec<EnumDecl>,
    #[serde(default)]
    pub constants: Vec<ConstDecl>,
    /// `None` declares a native-only struct.
    #[serde(default)]
    pub fields: Option<Vec<StructFieldDecl>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructFieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub typename: TypeName,
    #[serde(default)]
    pub ordinal: Option<u32>,
    #[serde(default)]
    pub default: Option<RawExpr>,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnionDecl {
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub fields: Vec<UnionFieldDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnionFieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub typename: TypeName,
    #[serde(default)]
    pub ordinal: Option<u32>,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub enums: Vec<EnumDecl>,
    #[serde(default)]
    pub constants: Vec<ConstDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub ordinal: Option<u32>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    /// `None` is fire-and-forget; `Some(vec![])` still expects a reply.
    #[serde(default)]
    pub response_parameters: Option<Vec<ParameterDecl>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub typename: TypeName,
    #[serde(default)]
    pub ordinal: Option<u32>,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub typename: TypeName,
    pub value: RawExpr,
    #[serde(default)]
    pub attributes: Attributes,
}

impl File {
    /// Decode a parsed mojom tree from JSON text.
    pub fn from_json_str(source_name: &str, src: &str) -> Result<Self, TranslateError> {
        crate::path_de::from_str_with_path(src).map_err(|message| TranslateError::Decode {
            source_name: source_name.to_string(),
            message,
        })
    }

    pub fn from_json_value(source_name: &str, value: serde_json::Value) -> Result<Self, TranslateError> {
        crate::path_de::from_value_with_path(value).map_err(|message| TranslateError::Decode {
            source_name: source_name.to_string(),
            message,
        })
    }
}

// ------------------------------- Tests ------------------------------------ //
