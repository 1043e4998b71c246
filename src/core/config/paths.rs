use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub log_dir: PathBuf,
    pub config_path: PathBuf,
    pub secrets_path: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let project_root = discover_project_root();
        let log_dir = env::var("POLICY_QA_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| project_root.join("logs"));
        let config_path = env::var("POLICY_QA_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| project_root.join("config.yml"));
        let secrets_path = env::var("POLICY_QA_SECRETS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| sibling_secrets_path(&config_path));

        let _ = fs::create_dir_all(&log_dir);

        AppPaths {
            project_root,
            log_dir,
            config_path,
            secrets_path,
        }
    }

    /// Paths rooted in a single directory, with no environment lookups.
    pub fn rooted_at(root: &Path) -> Self {
        let config_path = root.join("config.yml");
        AppPaths {
            project_root: root.to_path_buf(),
            log_dir: root.join("logs"),
            secrets_path: sibling_secrets_path(&config_path),
            config_path,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn sibling_secrets_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|dir| dir.join("secrets.yaml"))
        .unwrap_or_else(|| PathBuf::from("secrets.yaml"))
}

fn discover_project_root() -> PathBuf {
    if let Ok(root) = env::var("POLICY_QA_ROOT") {
        return PathBuf::from(root);
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if manifest_dir.join("config.yml").exists() {
        return manifest_dir;
    }

    env::current_dir().unwrap_or(manifest_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooted_paths_keep_secrets_next_to_config() {
        let paths = AppPaths::rooted_at(Path::new("/srv/policy-qa"));
        assert_eq!(paths.config_path, PathBuf::from("/srv/policy-qa/config.yml"));
        assert_eq!(paths.secrets_path, PathBuf::from("/srv/policy-qa/secrets.yaml"));
        assert_eq!(paths.log_dir, PathBuf::from("/srv/policy-qa/logs"));
    }
}
