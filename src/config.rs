use serde::Deserialize;

/// Knobs for a single translation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslateOptions {
    /// Fail when an unqualified reference matches at more than one scope level
    /// instead of taking the narrowest match.
    pub strict_lookup: bool,
}

impl TranslateOptions {
    pub fn strict() -> Self {
        Self { strict_lookup: true }
    }

    /// Load options from a JSON file, e.g. `{ "strict_lookup": true }`.
    pub fn load(path: &std::path::Path) -> Result<Self, String> {
        let bytes = std::fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
        crate::path_de::from_slice_with_path(&bytes)
    }
}
