use crate::error::{Result, StrataError};
use crate::siteconfig::directives::SiteConfig;
use crate::siteconfig::parser::ConfigParser;
use std::path::{Path, PathBuf};

/// File name looked up in the config directories
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Configuration loader for site configs
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Explicit config file, takes precedence over the directories
    config_file: Option<PathBuf>,
    /// Custom config directory path
    custom_dir: Option<PathBuf>,
    /// Standard config directory path
    standard_dir: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader that searches nowhere
    pub fn new() -> Self {
        Self { config_file: None, custom_dir: None, standard_dir: None }
    }

    /// Load the first configuration found
    ///
    /// Tries the explicit file, then `config.json` in the custom directory,
    /// then in the standard directory.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::ConfigError`] when no candidate exists, or the
    /// parse error of the first candidate that exists.
    pub fn load(&self) -> Result<SiteConfig> {
        let path = self.find_config_file().ok_or_else(|| {
            StrataError::ConfigError(format!("No {} found in the configured locations", CONFIG_FILE_NAME))
        })?;

        tracing::debug!(path = %path.display(), "loading site config");
        ConfigParser::parse_file(&path)
    }

    /// Candidate paths in priority order
    fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Some(file) = &self.config_file {
            candidates.push(file.clone());
        }
        for dir in [&self.custom_dir, &self.standard_dir].into_iter().flatten() {
            candidates.push(dir.join(CONFIG_FILE_NAME));
        }

        candidates
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        self.candidates().into_iter().find(|path| path.exists())
    }
}

/// Builder for ConfigLoader
#[derive(Debug, Default)]
pub struct ConfigLoaderBuilder {
    config_file: Option<PathBuf>,
    custom_dir: Option<PathBuf>,
    standard_dir: Option<PathBuf>,
}

impl ConfigLoaderBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit config file
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set custom config directory
    pub fn custom_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.custom_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set standard config directory
    pub fn standard_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.standard_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the ConfigLoader
    pub fn build(self) -> ConfigLoader {
        ConfigLoader { config_file: self.config_file, custom_dir: self.custom_dir, standard_dir: self.standard_dir }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        let mut builder = ConfigLoaderBuilder::new();

        if let Some(custom_dir) = Self::default_custom_dir() {
            builder = builder.custom_dir(custom_dir);
        }

        let standard_dir = PathBuf::from("site_configs");
        if standard_dir.is_dir() {
            builder = builder.standard_dir(standard_dir);
        }

        builder.build()
    }
}

impl ConfigLoader {
    /// Get default custom config directory (~/.config/strata)
    pub fn default_custom_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("strata"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = r#"{"selectors": {"lvl0": "h1"}}"#;

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("site.json");
        fs::write(&path, CONFIG).unwrap();

        let config = ConfigLoaderBuilder::new().config_file(&path).build().load().unwrap();
        assert!(config.selector_set("default").unwrap().get("lvl0").is_some());
    }

    #[test]
    fn test_custom_dir_wins_over_standard_dir() {
        let temp_dir = TempDir::new().unwrap();
        let custom = temp_dir.path().join("custom");
        let standard = temp_dir.path().join("standard");
        fs::create_dir_all(&custom).unwrap();
        fs::create_dir_all(&standard).unwrap();
        fs::write(custom.join(CONFIG_FILE_NAME), r#"{"selectors": {"lvl0": "h1.custom"}}"#).unwrap();
        fs::write(standard.join(CONFIG_FILE_NAME), r#"{"selectors": {"lvl0": "h1.standard"}}"#).unwrap();

        let loader = ConfigLoaderBuilder::new().custom_dir(&custom).standard_dir(&standard).build();
        let config = loader.load().unwrap();
        assert_eq!(config.selector_set("default").unwrap().get("lvl0").unwrap().selector, "h1.custom");
    }

    #[test]
    fn test_falls_through_missing_locations() {
        let temp_dir = TempDir::new().unwrap();
        let standard = temp_dir.path().join("standard");
        fs::create_dir_all(&standard).unwrap();
        fs::write(standard.join(CONFIG_FILE_NAME), CONFIG).unwrap();

        let loader = ConfigLoaderBuilder::new()
            .config_file(temp_dir.path().join("missing.json"))
            .custom_dir(temp_dir.path().join("nowhere"))
            .standard_dir(&standard)
            .build();
        assert!(loader.load().is_ok());
    }

    #[test]
    fn test_nothing_found() {
        let result = ConfigLoader::new().load();
        assert!(matches!(result, Err(StrataError::ConfigError(_))));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let result = ConfigLoaderBuilder::new().config_file(&path).build().load();
        assert!(matches!(result, Err(StrataError::Json(_))));
    }
}
