use liveedit_common::Namespace;
use liveedit_protocol::OriginPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "liveedit.config.json";

/// Live editing configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Namespace for store paths
    #[serde(default = "default_project_id")]
    pub project_id: String,

    /// Root of the file-backed store
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Prefix of URLs served for uploaded assets
    #[serde(default = "default_asset_base_url")]
    pub asset_base_url: String,

    /// Origins accepted on the message channel
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_origin")]
    pub editor_origin: String,

    #[serde(default = "default_origin")]
    pub preview_origin: String,
}

fn default_project_id() -> String {
    "default-project".to_string()
}

fn default_store_dir() -> String {
    ".liveedit".to_string()
}

fn default_asset_base_url() -> String {
    "/assets".to_string()
}

fn default_origin() -> String {
    "http://localhost:8080".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Absolute path of the store root
    pub fn store_root(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.store_dir)
    }

    /// Directory uploaded assets are written under
    pub fn asset_root(&self, cwd: &str) -> PathBuf {
        self.store_root(cwd).join("assets")
    }

    pub fn namespace(&self) -> Namespace {
        Namespace::new(self.project_id.clone())
    }

    /// Both configured origins are always accepted, plus `allowedOrigins`
    pub fn origin_policy(&self) -> OriginPolicy {
        OriginPolicy::allow(
            self.allowed_origins
                .iter()
                .chain([&self.editor_origin, &self.preview_origin])
                .cloned(),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            store_dir: default_store_dir(),
            asset_base_url: default_asset_base_url(),
            allowed_origins: vec![],
            editor_origin: default_origin(),
            preview_origin: default_origin(),
        }
    }
}
