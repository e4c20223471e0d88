//! Translation of parsed mojom trees into linked, code-generator-ready modules.
//!
//! `translate::translate` turns one `ast::File` into a `module::Module` whose
//! types are interned in a `kind::KindRegistry` and whose named values live in
//! a `value::ValueRegistry`. `batch::translate_files` does the same for a set
//! of files that import each other.
pub mod ast;
pub mod batch;
pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod kind;
pub mod module;
pub mod path_de;
pub mod translate;
pub mod value;

pub use config::TranslateOptions;
pub use error::{Result, TranslateError};
pub use module::Module;
pub use translate::{translate, translate_module};
