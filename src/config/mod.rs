use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

use crate::display::{RenderOptions, RendererKind};
use crate::protocol::ToolSpec;
use crate::transport::http::HttpConfig;
use crate::transport::responses::DEFAULT_BASE_URL;

pub const APP_NAME: &str = "respstream";
pub const ENV_PREFIX: &str = "RESPSTREAM";

pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join("Library/Application Support").join(APP_NAME))
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .map(|c| c.join(APP_NAME))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .map(|a| a.join(APP_NAME))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join(".config").join(APP_NAME))
    }
}

/// Settings from `config.toml` and `RESPSTREAM_*` variables. Command-line
/// flags are applied on top by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub renderer: RendererKind,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub instructions: Option<String>,
    pub vector_store_ids: Vec<String>,
    pub web_search: bool,
    pub code_interpreter: bool,
    pub json_lines: bool,
    pub viewport_height: u16,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            renderer: RendererKind::Rich,
            timeout_secs: 120,
            max_retries: 0,
            instructions: None,
            vector_store_ids: Vec::new(),
            web_search: false,
            code_interpreter: false,
            json_lines: false,
            viewport_height: 12,
            log_file: None,
            log_level: None,
        }
    }
}

impl AppConfig {
    /// Loads the user config, warning and falling back to defaults when it
    /// cannot be read.
    #[must_use]
    pub fn load() -> Self {
        let path = Self::get_config_path();
        Self::load_from(path.as_deref()).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config: {e}");
            Self::default()
        })
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("vector_store_ids"),
        );

        builder.build().and_then(Config::try_deserialize)
    }

    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        get_config_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn init_default() -> Result<PathBuf, io::Error> {
        let path = Self::get_config_path().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;
        Self::init_at(&path)?;
        Ok(path)
    }

    /// Writes the commented template to `path`, refusing to overwrite.
    pub fn init_at(path: &Path) -> Result<(), io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {}", path.display()),
            ));
        }

        fs::write(path, include_str!("config.template.toml"))
    }

    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::new()
            .with_timeout(Duration::from_secs(self.timeout_secs.max(1)))
            .with_max_retries(self.max_retries)
    }

    #[must_use]
    pub const fn render_options(&self) -> RenderOptions {
        RenderOptions {
            json_lines: self.json_lines,
            viewport_height: self.viewport_height,
        }
    }

    /// Tools enabled by these settings, in request order.
    #[must_use]
    pub fn tools(&self) -> Vec<ToolSpec> {
        let mut tools = Vec::new();
        if !self.vector_store_ids.is_empty() {
            tools.push(ToolSpec::file_search(self.vector_store_ids.clone()));
        }
        if self.web_search {
            tools.push(ToolSpec::WebSearch);
        }
        if self.code_interpreter {
            tools.push(ToolSpec::code_interpreter());
        }
        tools
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.renderer, RendererKind::Rich);
        assert_eq!(config.max_retries, 0);
        assert!(config.tools().is_empty());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::load_from(Some(&dir.path().join("absent.toml"))).expect("load");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn reads_toml_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
model = "gpt-4.1-mini"
renderer = "plain"
vector_store_ids = ["vs_1", "vs_2"]
web_search = true
viewport_height = 20
"#,
        )
        .expect("write");

        let config = AppConfig::load_from(Some(&path)).expect("load");

        assert_eq!(config.model, "gpt-4.1-mini");
        assert_eq!(config.renderer, RendererKind::Plain);
        assert_eq!(config.render_options().viewport_height, 20);
        assert_eq!(
            config.tools(),
            vec![
                ToolSpec::file_search(vec!["vs_1".into(), "vs_2".into()]),
                ToolSpec::WebSearch
            ]
        );
    }

    #[test]
    fn init_writes_template_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        AppConfig::init_at(&path).expect("init");
        let written = AppConfig::load_from(Some(&path)).expect("template parses");
        assert_eq!(written, AppConfig::default());

        let err = AppConfig::init_at(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn http_config_uses_timeout_and_retries() {
        let config = AppConfig {
            timeout_secs: 30,
            max_retries: 2,
            ..AppConfig::default()
        };
        let http = config.http_config();
        assert_eq!(http.timeout, Duration::from_secs(30));
        assert_eq!(http.max_retries, 2);
    }
}
