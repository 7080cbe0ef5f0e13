use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::{env, fs, path::Path};
use thiserror::Error;
use tracing::{info, warn};
use utils::errors::{CONFIG_ALREADY_INITIALIZED, CONFIG_NOT_INITIALIZED};

pub static CONFIG: OnceCell<ContentConfig> = OnceCell::new();

pub const DEFAULT_CONFIG_PATH: &str = "content.yaml";
pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://admin-al-asr.centers.pk/graphql";
pub const DEFAULT_SITE_BASE_URL: &str = "https://al-asr.centers.pk";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}", CONFIG_ALREADY_INITIALIZED)]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ContentConfig {
    pub gateway: GatewayConfig,
    pub site: SiteConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub posts_limit: u32,
    pub categories_limit: u32,
    pub pages_limit: u32,
    pub hide_empty_categories: bool,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GRAPHQL_ENDPOINT.to_string(),
            posts_limit: 100,
            categories_limit: 50,
            pages_limit: 100,
            hide_empty_categories: true,
            max_retries: 3,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub featured_limit: usize,
    /// Page slugs that never make it into the sitemap.
    pub excluded_page_slugs: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SITE_BASE_URL.to_string(),
            featured_limit: 6,
            excluded_page_slugs: ["tag", "author", "feed", "search"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

pub fn load() -> Result<(), ConfigError> {
    let path = env::var("CONTENT_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&path);
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)
}

pub fn get_config() -> &'static ContentConfig {
    CONFIG.get().expect(CONFIG_NOT_INITIALIZED)
}

/// Reads the YAML file at `path`, falling back to defaults, then applies env overrides.
pub fn load_config(path: impl AsRef<Path>) -> ContentConfig {
    let path = path.as_ref();
    let mut config = match fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<ContentConfig>(&contents) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    error = %err,
                    path = %path.display(),
                    "Failed to parse content config, using defaults"
                );
                ContentConfig::default()
            }
        },
        Err(err) => {
            warn!(error = %err, path = %path.display(), "Content config not found, using defaults");
            ContentConfig::default()
        }
    };

    apply_env_overrides(&mut config);

    info!(
        endpoint = %config.gateway.endpoint,
        base_url = %config.site.base_url,
        posts_limit = config.gateway.posts_limit,
        categories_limit = config.gateway.categories_limit,
        "Content config loaded"
    );

    config
}

fn apply_env_overrides(config: &mut ContentConfig) {
    // WORDPRESS_API_URL wins over the legacy public variable name.
    if let Some(endpoint) = ["WORDPRESS_API_URL", "NEXT_PUBLIC_WORDPRESS_API_URL"]
        .into_iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
    {
        config.gateway.endpoint = endpoint;
    }

    if let Ok(value) = env::var("SITE_BASE_URL") {
        config.site.base_url = value;
    }

    if let Ok(value) = env::var("BIND_ADDRESS") {
        config.server.bind_address = value;
    }

    if let Ok(value) = env::var("CONTENT_POSTS_LIMIT") {
        match value.parse::<u32>() {
            Ok(limit) => config.gateway.posts_limit = limit,
            Err(err) => {
                warn!(error = %err, value = %value, "Failed to parse CONTENT_POSTS_LIMIT override");
            }
        }
    }

    if let Ok(value) = env::var("CONTENT_MAX_RETRIES") {
        match value.parse::<u32>() {
            Ok(retries) => config.gateway.max_retries = retries,
            Err(err) => {
                warn!(error = %err, value = %value, "Failed to parse CONTENT_MAX_RETRIES override");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const OVERRIDE_KEYS: [&str; 7] = [
        "WORDPRESS_API_URL",
        "NEXT_PUBLIC_WORDPRESS_API_URL",
        "SITE_BASE_URL",
        "BIND_ADDRESS",
        "CONTENT_POSTS_LIMIT",
        "CONTENT_MAX_RETRIES",
        "CONTENT_CONFIG_PATH",
    ];

    fn clear_overrides() {
        for key in OVERRIDE_KEYS {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    fn write_temp_config(name: &str, contents: &str) -> std::path::PathBuf {
        let file_name = format!("alasr-content-{}-{name}.yaml", std::process::id());
        let path = env::temp_dir().join(file_name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    #[serial]
    fn missing_file_falls_back_to_defaults() {
        clear_overrides();
        let config = load_config("/definitely/not/here/content.yaml");
        assert_eq!(config, ContentConfig::default());
        assert_eq!(config.gateway.posts_limit, 100);
        assert_eq!(config.gateway.categories_limit, 50);
        assert_eq!(config.site.excluded_page_slugs, vec!["tag", "author", "feed", "search"]);
    }

    #[test]
    #[serial]
    fn partial_file_keeps_remaining_defaults() {
        clear_overrides();
        let path = write_temp_config(
            "partial",
            "gateway:\n  endpoint: http://cms.local/graphql\n  posts_limit: 20\nsite:\n  featured_limit: 3\n",
        );

        let config = load_config(&path);
        assert_eq!(config.gateway.endpoint, "http://cms.local/graphql");
        assert_eq!(config.gateway.posts_limit, 20);
        assert_eq!(config.gateway.categories_limit, 50);
        assert_eq!(config.site.featured_limit, 3);
        assert_eq!(config.site.base_url, DEFAULT_SITE_BASE_URL);

        fs::remove_file(path).ok();
    }

    #[test]
    #[serial]
    fn malformed_file_falls_back_to_defaults() {
        clear_overrides();
        let path = write_temp_config("malformed", "gateway: [not, a, map");
        assert_eq!(load_config(&path), ContentConfig::default());
        fs::remove_file(path).ok();
    }

    #[test]
    #[serial]
    fn env_overrides_apply_and_bad_numbers_are_ignored() {
        clear_overrides();
        unsafe {
            env::set_var("NEXT_PUBLIC_WORDPRESS_API_URL", "http://legacy/graphql");
            env::set_var("WORDPRESS_API_URL", "http://primary/graphql");
            env::set_var("SITE_BASE_URL", "http://example.test");
            env::set_var("CONTENT_POSTS_LIMIT", "25");
            env::set_var("CONTENT_MAX_RETRIES", "many");
        }

        let config = load_config("/definitely/not/here/content.yaml");
        assert_eq!(config.gateway.endpoint, "http://primary/graphql");
        assert_eq!(config.site.base_url, "http://example.test");
        assert_eq!(config.gateway.posts_limit, 25);
        assert_eq!(config.gateway.max_retries, 3);

        clear_overrides();
    }

    #[test]
    #[serial]
    fn legacy_endpoint_variable_is_honoured() {
        clear_overrides();
        unsafe {
            env::set_var("NEXT_PUBLIC_WORDPRESS_API_URL", "http://legacy/graphql");
        }
        let config = load_config("/definitely/not/here/content.yaml");
        assert_eq!(config.gateway.endpoint, "http://legacy/graphql");
        clear_overrides();
    }
}
