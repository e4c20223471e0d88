//! Error taxonomy for the translation pipeline.
//!
//! Every variant is fatal: the assembler never hands back a partial module.
//! `site` strings name the declaration being translated (e.g.
//! `struct my.ns.Foo field 'bar'`) so the message points at the mojom source.

use thiserror::Error;

pub type Result<T, E = TranslateError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TranslateError {
    // ---- input / structural ----
    #[error("failed to read {}: {source}", path.display())]
    Io { path: std::path::PathBuf, source: std::io::Error },

    #[error("failed to decode mojom tree ({source_name}): {message}")]
    Decode { source_name: String, message: String },

    #[error("malformed type specifier `{spec}`: {reason}")]
    MalformedSpec { spec: String, reason: &'static str },

    // ---- references ----
    #[error("{site}: unknown type `{spec}`")]
    UnknownType { site: String, spec: String },

    #[error("{site}: unresolved identifier `{name}`")]
    UnresolvedIdentifier { site: String, name: String },

    #[error("{site}: reference `{name}` is ambiguous, candidates: {}", candidates.join(", "))]
    AmbiguousReference { site: String, name: String, candidates: Vec<String> },

    #[error("enum {enum_spec} field '{field}': unresolved enum value")]
    UnresolvedEnumValue { enum_spec: String, field: String },

    #[error("enum {enum_spec} field '{field}': `{literal}` is not an integer")]
    InvalidEnumLiteral { enum_spec: String, field: String, literal: String },

    #[error("module {module}: import `{import}` was not provided")]
    MissingImport { module: String, import: String },

    #[error("import cycle between modules: {}", modules.join(" -> "))]
    ImportCycle { modules: Vec<String> },

    // ---- semantic constraints ----
    #[error("{site}: `{spec}` cannot be made nullable")]
    InvalidNullable { site: String, spec: String },

    #[error("{site}: `{spec}` must refer to an interface")]
    InvalidInterfaceRequest { site: String, spec: String },

    #[error("{site}: `{spec}` has an invalid map key; keys cannot be nullable, handles, interfaces or containers")]
    InvalidMapKey { site: String, spec: String },

    #[error("{site}: `{spec}` must refer to an interface or an interface request")]
    InvalidAssociatedKind { site: String, spec: String },

    #[error(
        "interface {interface} method '{method}': only methods with a response can include a [Sync] attribute; \
         use an empty response parameter list (\"=> ()\") if no response values are needed"
    )]
    SyncWithoutResponse { interface: String, method: String },

    #[error("native-only {what} declaration {name} must include a [Native] attribute")]
    NativeWithoutAttribute { what: &'static str, name: String },

    #[error("duplicate definition of `{spec}`")]
    DuplicateDefinition { spec: String },

    #[error("module `{name}` is provided more than once")]
    DuplicateModule { name: String },
}

impl TranslateError {
    pub(crate) fn malformed(spec: impl Into<String>, reason: &'static str) -> Self {
        TranslateError::MalformedSpec { spec: spec.into(), reason }
    }
}
