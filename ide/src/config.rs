use serde::Deserialize;

use crate::IdeError;

/// Default for [`IdeConfig::max_diagnostics`].
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 100;
/// Default for [`IdeConfig::completion_limit`].
pub const DEFAULT_COMPLETION_LIMIT: usize = 200;

/// Editor-facing settings. Owned by the caller and passed to each query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdeConfig {
    /// Cap on the diagnostics published for one document.
    pub max_diagnostics: usize,
    /// Show `---` doc comments of the declaration in hover.
    pub hover_doc_comments: bool,
    /// Cap on local-name completion items.
    pub completion_limit: usize,
}

impl Default for IdeConfig {
    fn default() -> Self {
        Self {
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
            hover_doc_comments: true,
            completion_limit: DEFAULT_COMPLETION_LIMIT,
        }
    }
}

impl IdeConfig {
    /// Parses the settings object an editor sends. Missing keys keep their defaults and an
    /// empty string yields the default config.
    pub fn from_json(json: &str) -> Result<Self, IdeError> {
        let trimmed = json.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let config: IdeConfig =
            serde_json::from_str(trimmed).map_err(|e| IdeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), IdeError> {
        if self.max_diagnostics == 0 {
            return Err(IdeError::InvalidConfig(
                "max_diagnostics must be at least 1".into(),
            ));
        }
        if self.completion_limit == 0 {
            return Err(IdeError::InvalidConfig(
                "completion_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
