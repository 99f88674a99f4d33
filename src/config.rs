use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DASHBOARD: &str = "k8s-pod-resources-clean/kubernetes-pod-resource-dashboard-v3";

const MASKED_PASSWORD: &str = "*****";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub context_match: String,
    pub base_url: String,
    #[serde(default)]
    pub dashboard: String,
    #[serde(default)]
    pub prometheus_uid: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub default_dashboard: String,
    #[serde(default)]
    pub default_prometheus_uid: String,
    #[serde(default)]
    pub environments: Vec<Environment>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = config_path().context("could not determine the user config directory")?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| {
            format!(
                "failed to read config {} (run 'grafana-connect config update' to create one)",
                path.display()
            )
        })?;
        let config = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    // Written to a sibling temp file first so a crash mid-write cannot
    // truncate the existing config.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let rendered = serde_yaml::to_string(self).context("failed to serialize config")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory {}", parent.display())
            })?;
        }
        let staged = path.with_extension("yaml.tmp");
        fs::write(&staged, rendered)
            .with_context(|| format!("failed to write config {}", staged.display()))?;
        fs::rename(&staged, path)
            .with_context(|| format!("failed to replace config {}", path.display()))?;
        Ok(())
    }

    pub fn dashboard_for<'a>(&'a self, env: &'a Environment) -> &'a str {
        if !env.dashboard.is_empty() {
            &env.dashboard
        } else if !self.default_dashboard.is_empty() {
            &self.default_dashboard
        } else {
            DEFAULT_DASHBOARD
        }
    }

    pub fn prometheus_uid_for<'a>(&'a self, env: &'a Environment) -> &'a str {
        if !env.prometheus_uid.is_empty() {
            &env.prometheus_uid
        } else {
            &self.default_prometheus_uid
        }
    }

    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        for env in &mut masked.environments {
            if !env.password.is_empty() {
                env.password = MASKED_PASSWORD.to_string();
            }
        }
        masked
    }

    pub fn environment_by_base_url(&self, base_url: &str) -> Option<&Environment> {
        self.environments.iter().find(|env| env.base_url == base_url)
    }

    /// Replaces the entry with the same base_url, or appends a new one.
    /// Returns true when an existing entry was updated.
    pub fn upsert_environment(&mut self, env: Environment) -> bool {
        if let Some(existing) = self
            .environments
            .iter_mut()
            .find(|existing| existing.base_url == env.base_url)
        {
            *existing = env;
            true
        } else {
            self.environments.push(env);
            false
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("GRAFANA_CONNECT_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|dir| dir.join("grafana-connect").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::{Config, DEFAULT_DASHBOARD, Environment};

    fn sample_env(name: &str, base_url: &str) -> Environment {
        Environment {
            name: name.to_string(),
            alias: format!("{name}-alias"),
            context_match: format!(".*{name}.*"),
            base_url: base_url.to_string(),
            dashboard: "team/dash".to_string(),
            prometheus_uid: "uid-1".to_string(),
            username: "viewer".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn round_trip_preserves_environment_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let config = Config {
            default_dashboard: "global/dash".to_string(),
            default_prometheus_uid: "global-uid".to_string(),
            environments: vec![
                sample_env("prod", "https://g.prod.example.com"),
                sample_env("staging", "https://g.stg.example.com"),
            ],
        };

        config.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.environments.push(sample_env("prod", "https://g.example.com"));
        config.save_to(&path).unwrap();

        config.environments[0].username = "admin".to_string();
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.environments[0].username, "admin");
        assert_eq!(reloaded.environments.len(), 1);
    }

    #[test]
    fn load_missing_file_mentions_update_command() {
        let dir = tempfile::tempdir().unwrap();
        let error = Config::load_from(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(error.to_string().contains("config update"));
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let raw = "environments:\n  - name: prod\n    base_url: https://g.example.com\n";
        let config: Config = serde_yaml::from_str(raw).unwrap();
        let env = &config.environments[0];
        assert_eq!(env.name, "prod");
        assert!(env.alias.is_empty());
        assert!(env.context_match.is_empty());
        assert!(env.password.is_empty());
    }

    #[test]
    fn dashboard_falls_back_to_global_then_builtin() {
        let mut config = Config::default();
        let mut env = sample_env("prod", "https://g.example.com");

        assert_eq!(config.dashboard_for(&env), "team/dash");

        env.dashboard.clear();
        config.default_dashboard = "global/dash".to_string();
        assert_eq!(config.dashboard_for(&env), "global/dash");

        config.default_dashboard.clear();
        assert_eq!(config.dashboard_for(&env), DEFAULT_DASHBOARD);
    }

    #[test]
    fn prometheus_uid_falls_back_to_global() {
        let config = Config {
            default_prometheus_uid: "global-uid".to_string(),
            ..Config::default()
        };
        let mut env = sample_env("prod", "https://g.example.com");

        assert_eq!(config.prometheus_uid_for(&env), "uid-1");
        env.prometheus_uid.clear();
        assert_eq!(config.prometheus_uid_for(&env), "global-uid");
    }

    #[test]
    fn masked_hides_only_non_empty_passwords() {
        let mut config = Config::default();
        config.environments.push(sample_env("prod", "https://a.example.com"));
        let mut open_env = sample_env("dev", "https://b.example.com");
        open_env.password.clear();
        config.environments.push(open_env);

        let masked = config.masked();
        assert_eq!(masked.environments[0].password, "*****");
        assert!(masked.environments[1].password.is_empty());
        // the source config is untouched
        assert_eq!(config.environments[0].password, "secret");
    }

    #[test]
    fn upsert_replaces_entry_with_same_base_url() {
        let mut config = Config::default();
        config.environments.push(sample_env("prod", "https://g.example.com"));

        let mut updated = sample_env("prod-renamed", "https://g.example.com");
        updated.username = "admin".to_string();
        assert!(config.upsert_environment(updated));
        assert_eq!(config.environments.len(), 1);
        assert_eq!(config.environments[0].name, "prod-renamed");
        assert_eq!(config.environments[0].username, "admin");
    }

    #[test]
    fn upsert_appends_entry_with_new_base_url() {
        let mut config = Config::default();
        config.environments.push(sample_env("prod", "https://a.example.com"));
        assert!(!config.upsert_environment(sample_env("dev", "https://b.example.com")));
        assert_eq!(config.environments.len(), 2);
        assert_eq!(config.environments[1].name, "dev");
    }
}
