//! Configuration – reads `~/.priorityplot/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted user configuration stored in `~/.priorityplot/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path of the goal-memory file.  Empty means the built-in default
    /// (`~/.priorityplot/goal_memory.json`).
    #[serde(default)]
    pub memory_path: String,
}

impl Config {
    /// Resolve the goal-memory path: config value if set, otherwise the
    /// engine's per-user default.
    pub fn resolved_memory_path(&self) -> PathBuf {
        if self.memory_path.is_empty() {
            priorityplot_memory::GoalMemory::default_storage_path()
        } else {
            PathBuf::from(&self.memory_path)
        }
    }
}

/// Return the path to `~/.priorityplot/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".priorityplot").join("config.toml")
}

/// Load the config from disk, falling back to defaults when the file does
/// not exist, then apply environment overrides.
pub fn load() -> Result<Config, String> {
    let mut cfg = load_from(&config_path())?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from a specific path.  Returns `None` if the file does
/// not exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `PRIORITYPLOT_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `PRIORITYPLOT_MEMORY_PATH` | `memory_path` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("PRIORITYPLOT_MEMORY_PATH") {
        cfg.memory_path = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_points_to_priorityplot_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".priorityplot"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn load_from_reads_memory_path() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "memory_path = \"/tmp/custom.json\"\n").unwrap();

        let cfg = load_from(&path).expect("load ok").expect("some");
        assert_eq!(cfg.memory_path, "/tmp/custom.json");
        assert_eq!(cfg.resolved_memory_path(), PathBuf::from("/tmp/custom.json"));
    }

    #[test]
    fn load_from_reports_malformed_toml() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "memory_path = [not toml").unwrap();

        let err = load_from(&path).expect_err("parse must fail");
        assert!(err.contains("Failed to parse config"));
    }

    #[test]
    fn default_config_resolves_to_per_user_path() {
        let cfg = Config::default();
        let resolved = cfg.resolved_memory_path();
        assert!(resolved.to_string_lossy().ends_with("goal_memory.json"));
    }

    #[test]
    fn apply_env_overrides_changes_memory_path() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("PRIORITYPLOT_MEMORY_PATH", "/tmp/override.json") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.memory_path, "/tmp/override.json");
        unsafe { std::env::remove_var("PRIORITYPLOT_MEMORY_PATH") };
    }
}
