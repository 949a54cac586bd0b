//! `docindex.toml` settings.
//!
//! Lookup order for the config file: an explicit path, `$DOCINDEX_CONFIG`,
//! `./docindex.toml`, then `<config dir>/docindex/config.toml`. A missing
//! file at any implicit location is not an error; defaults apply.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use docindex_common::{DEFAULT_VAR_NAME, Error, Result};

use crate::codec::{self, ParseMode};
use crate::common::find_index_file;
use crate::search::docs_index::{DEFAULT_LIMIT, DEFAULT_TITLE_BOOST};
use crate::search::SearchOptions;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "DOCINDEX_CONFIG";
/// Config filename looked up in the working directory.
pub const CONFIG_FILENAME: &str = "docindex.toml";
/// Directory under the platform config dir.
const CONFIG_DIR_NAME: &str = "docindex";

/// Search defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSettings {
    /// Maximum hits per query, 0 for unlimited.
    pub limit: usize,
    /// Title weight relative to text.
    pub title_boost: f64,
    /// Prefix expansion of query terms.
    pub prefix: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            title_boost: DEFAULT_TITLE_BOOST,
            prefix: true,
        }
    }
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Index file to load when none is given on the command line.
    pub index: Option<PathBuf>,
    /// Variable name used when writing JS output.
    pub var_name: String,
    /// Abort on malformed records instead of dropping them.
    pub strict: bool,
    /// Search defaults.
    pub search: SearchSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index: None,
            var_name: DEFAULT_VAR_NAME.to_string(),
            strict: false,
            search: SearchSettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: Self = toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))?;
        settings.checked()
    }

    /// Read settings from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let settings: Self = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        settings
            .checked()
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    fn checked(self) -> Result<Self> {
        codec::check_var_name(&self.var_name)
            .map_err(|_| Error::Config(format!("var_name '{}' is not a valid identifier", self.var_name)))?;
        Ok(self)
    }

    /// Load settings using the process environment and working directory.
    ///
    /// Returns the settings and the file they came from, if any.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        let user = dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join("config.toml"));
        Self::load_from(explicit, from_env.as_deref(), &cwd, user.as_deref())
    }

    /// [`Settings::load`] with every input passed in.
    ///
    /// Explicit and environment paths must exist; the working-directory and
    /// user files are optional.
    pub fn load_from(
        explicit: Option<&Path>,
        from_env: Option<&Path>,
        cwd: &Path,
        user: Option<&Path>,
    ) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit.or(from_env) {
            tracing::debug!("Loading config from {}", path.display());
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        let local = cwd.join(CONFIG_FILENAME);
        for path in std::iter::once(local.as_path()).chain(user) {
            if path.is_file() {
                tracing::debug!("Loading config from {}", path.display());
                return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok((Self::default(), None))
    }

    /// Parse mode implied by `strict`.
    pub fn parse_mode(&self) -> ParseMode {
        if self.strict {
            ParseMode::Strict
        } else {
            ParseMode::Tolerant
        }
    }

    /// Search options seeded from the configured defaults.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            limit: self.search.limit,
            title_boost: self.search.title_boost,
            prefix: self.search.prefix,
            ..SearchOptions::default()
        }
    }

    /// Pick the index file: the override, then the configured path, then the
    /// usual build locations under `cwd`.
    pub fn resolve_index_path(&self, cwd: &Path, override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = override_path.or(self.index.as_deref()) {
            return Ok(if path.is_absolute() {
                path.to_path_buf()
            } else {
                cwd.join(path)
            });
        }
        find_index_file(cwd).ok_or_else(|| {
            Error::Config(format!(
                "No search index found under {}; pass --index or set `index` in {CONFIG_FILENAME}",
                cwd.display()
            ))
        })
    }
}
