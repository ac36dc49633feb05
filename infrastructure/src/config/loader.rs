//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["taskforce.toml", ".taskforce.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `TASKFORCE_*` environment variables (`TASKFORCE_ORCHESTRATOR__MAX_TURNS=5`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./taskforce.toml` or `./.taskforce.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/taskforce/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut files = Vec::new();
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            files.push(global_path);
        }
        if let Some(project_path) = Self::project_config_path() {
            files.push(project_path);
        }
        if let Some(path) = config_path {
            files.push(path.clone());
        }

        Self::figment_for(&files)
            .merge(Env::prefixed("TASKFORCE_").split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Merge `files` over the defaults, later files winning.
    pub fn load_files(files: &[PathBuf]) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment_for(files).extract().map_err(Box::new)
    }

    fn figment_for(files: &[PathBuf]) -> Figment {
        files.iter().fold(
            Figment::new().merge(Serialized::defaults(FileConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/taskforce/config.toml if set,
    /// otherwise falls back to ~/.config/taskforce/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("taskforce").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used (for `--show-config`)
    pub fn describe_sources(explicit: Option<&Path>) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];
        lines.push("  [     ] Environment: TASKFORCE_<SECTION>__<KEY>".to_string());

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            lines.push(format!("  [{:<5}] Explicit: {}", mark, path.display()));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push("  [     ] Project: ./taskforce.toml or ./.taskforce.toml".to_string()),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{}] Global:  {}", mark, path.display()));
        }

        lines.push("  [     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.orchestrator.max_turns, 20);
        assert_eq!(config.orchestrator.max_stalls, 3);
        assert!(!config.roster.hil_mode);
    }

    #[test]
    fn test_later_files_override_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let global = write_config(
            &dir,
            "global.toml",
            "[orchestrator]\nmax_turns = 10\nmax_stalls = 4\n",
        );
        let explicit = write_config(&dir, "explicit.toml", "[orchestrator]\nmax_turns = 6\n");

        let config = ConfigLoader::load_files(&[global, explicit]).unwrap();
        assert_eq!(config.orchestrator.max_turns, 6);
        // untouched keys survive from the earlier file
        assert_eq!(config.orchestrator.max_stalls, 4);
        assert_eq!(config.model.name, "gpt-4o");
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write_config(&dir, "broken.toml", "[orchestrator]\nmax_turns = \"many\"\n");
        assert!(ConfigLoader::load_files(&[broken]).is_err());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("taskforce"));
    }

    #[test]
    fn test_describe_sources_lists_defaults() {
        let lines = ConfigLoader::describe_sources(None);
        assert!(lines.last().unwrap().contains("built-in defaults"));
    }
}
