//! RON file loading for match configs, template tables and scripted players.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;
use void_core::config::MatchConfig;
use void_core::data::TemplateRegistry;
use void_core::error::GameError;
use void_core::simulation::Match;

use crate::scripted::ScriptedPlayer;

/// Errors that can occur while loading data files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read a file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse RON.
    #[error("Failed to parse '{path}': {message}")]
    Parse {
        /// File path.
        path: String,
        /// Parser message, including the position.
        message: String,
    },

    /// The file parsed but its contents are unusable.
    #[error("Invalid data in '{path}': {source}")]
    Validation {
        /// File path, or a label for combined checks.
        path: String,
        /// The first problem found.
        #[source]
        source: GameError,
    },
}

fn read_ron<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let label = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: label.clone(),
        source,
    })?;
    ron::from_str(&content).map_err(|e| LoadError::Parse {
        path: label,
        message: e.to_string(),
    })
}

fn validation(path: &Path) -> impl FnOnce(GameError) -> LoadError + '_ {
    move |source| LoadError::Validation {
        path: path.display().to_string(),
        source,
    }
}

/// Load and validate a match config. Missing fields take their defaults.
pub fn load_match_config(path: &Path) -> Result<MatchConfig, LoadError> {
    let config: MatchConfig = read_ron(path)?;
    config.ensure_valid().map_err(validation(path))?;
    tracing::debug!(path = %path.display(), seed = config.seed, "Loaded match config");
    Ok(config)
}

/// Load and validate a template table.
pub fn load_templates(path: &Path) -> Result<TemplateRegistry, LoadError> {
    let templates: TemplateRegistry = read_ron(path)?;
    templates.ensure_valid().map_err(validation(path))?;
    tracing::debug!(
        path = %path.display(),
        allies = templates.allies.len(),
        enemies = templates.enemies.len(),
        "Loaded templates"
    );
    Ok(templates)
}

/// Load a scripted player.
pub fn load_player(path: &Path) -> Result<ScriptedPlayer, LoadError> {
    read_ron(path)
}

/// Build a match from optional config and template files.
///
/// Absent paths fall back to [`MatchConfig::default`] and the standard
/// roster. The combination is validated as a whole, so a config whose
/// default unit is missing from the templates is rejected here.
pub fn load_match(
    config_path: Option<&Path>,
    templates_path: Option<&Path>,
) -> Result<Match, LoadError> {
    let config = config_path
        .map(load_match_config)
        .transpose()?
        .unwrap_or_default();
    let templates = templates_path
        .map(load_templates)
        .transpose()?
        .unwrap_or_default();

    Match::validated(config, templates).map_err(|source| LoadError::Validation {
        path: config_path
            .or(templates_path)
            .map_or_else(|| "built-in defaults".to_string(), |p| p.display().to_string()),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_match_config(Path::new("/nonexistent/match.ron")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/match.ron"));
    }

    #[test]
    fn test_defaults_build_a_match() {
        let game = load_match(None, None).unwrap();
        assert_eq!(game.selected_unit(), "basic");
        assert!(!game.is_running());
    }
}
