//! Minimal CLI: mojom trees (JSON) → translated module view | kind registry
use std::path::PathBuf;
use std::sync::Once;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::batch::{SourceFile, translate_files};
use crate::config::TranslateOptions;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// translate parsed mojom files into linked modules and print them as JSON
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// translate and print every module
    Translate(TranslateOut),
    /// translate and list each module's kind registry
    Kinds(KindsOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// reject unqualified references that match at more than one scope level
    #[arg(long, default_value_t = false)]
    strict_lookup: bool,

    /// JSON options file, e.g. {"strict_lookup": true}
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct TranslateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct KindsOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// only list this module
    #[arg(long)]
    module: Option<String>,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn options(&self) -> Result<TranslateOptions> {
        let mut options = match self.config.as_ref() {
            Some(path) => TranslateOptions::load(path)
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("failed to load options from {}", path.display()))?,
            None => TranslateOptions::default(),
        };
        options.strict_lookup |= self.strict_lookup;
        Ok(options)
    }

    fn translate(&self) -> Result<Vec<std::sync::Arc<crate::module::Module>>> {
        let options = self.options()?;
        let source_paths = resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")?;
        let sources = source_paths
            .iter()
            .map(|path| SourceFile::load(path))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(files = sources.len(), strict = options.strict_lookup, "translating");
        Ok(translate_files(&sources, options)?)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        init_tracing();
        match &self.cmd {
            Command::Translate(target) => {
                let modules = target.input_settings.translate()?;
                let view = modules.iter().map(|m| crate::emit::emit_module(m)).collect::<Vec<_>>();
                write_json(target.out.as_ref(), &serde_json::Value::Array(view))
            }
            Command::Kinds(target) => {
                let modules = target.input_settings.translate()?;
                let view = modules
                    .iter()
                    .filter(|m| target.module.as_deref().is_none_or(|name| name == m.name))
                    .map(|m| crate::emit::emit_kinds(m))
                    .collect::<Vec<_>>();
                if let (Some(name), true) = (target.module.as_ref(), view.is_empty()) {
                    anyhow::bail!("no module named `{name}` among the inputs");
                }
                write_json(target.out.as_ref(), &serde_json::Value::Array(view))
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

static TRACING_INIT: Once = Once::new();

/// Log to stderr, filtered by `RUST_LOG`. Silent unless `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

fn write_json(out: Option<&PathBuf>, value: &serde_json::Value) -> Result<()> {
    let src = serde_json::to_string_pretty(value)?;
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, &src).with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{src}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

// ------------------------------- Tests ------------------------------------ //
