//! Configuration loading
//!
//! Layers, lowest to highest precedence: built-in defaults, `repo-context.toml`
//! (or the file given with `--config`), `REPO_CONTEXT_*` environment variables,
//! then command-line overrides.

mod merge;

pub use merge::{merge_cli_with_config, CliOverrides};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::path::Path;
use tracing::debug;

use crate::domain::{Config, CONFIG_FILE_NAME};
use crate::error::ConfigError;

/// Prefix of environment variables that override config keys.
pub const ENV_PREFIX: &str = "REPO_CONTEXT_";

/// Load configuration for a run anchored at `anchor` (the repository
/// directory, or the working directory for remote sources).
pub fn load_config(anchor: &Path, explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(ConfigError::Missing { path: path.to_path_buf() });
            }
            debug!(path = %path.display(), "Loading config file");
            figment = figment.merge(Toml::file(path));
        }
        None => {
            let candidate = anchor.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                debug!(path = %candidate.display(), "Loading config file");
                figment = figment.merge(Toml::file(candidate));
            }
        }
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX));
    Ok(figment.extract()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_config_file() {
        let dir = TempDir::new().expect("temp dir");
        let config = load_config(dir.path(), None).expect("load");
        assert_eq!(config.max_file_bytes, 1_000_000);
        assert!(config.convert_html);
        assert!(config.include_untracked);
        assert!(config.exclude_globs.is_empty());
    }

    #[test]
    fn repository_config_file_is_picked_up() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "exclude = [\"*.log\"]\nmax_file_bytes = 2048\nconvert_html = false\nref = \"dev\"\n",
        )
        .expect("write config");

        let config = load_config(dir.path(), None).expect("load");
        assert_eq!(config.exclude_globs, vec!["*.log".to_string()]);
        assert_eq!(config.max_file_bytes, 2048);
        assert!(!config.convert_html);
        assert_eq!(config.ref_.as_deref(), Some("dev"));
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = TempDir::new().expect("temp dir");
        let err = load_config(dir.path(), Some(&dir.path().join("nope.toml")))
            .err()
            .expect("should fail");
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("bad.toml");
        fs::write(&path, "max_file_bytes = \"lots\"\n").expect("write");
        let err = load_config(dir.path(), Some(&path)).err().expect("should fail");
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
