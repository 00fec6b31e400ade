use crate::openai::PollPolicy;
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Directory the browser client is served from
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub openai: OpenAiConfig,
    #[serde(default = "default_assistants")]
    pub assistants: Vec<AssistantEntry>,
    pub run: RunConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub static_dir: String,
}

#[derive(Deserialize, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// One row of the assistant directory: display name to upstream id.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AssistantEntry {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RunConfig {
    pub poll_initial_ms: u64,
    pub poll_max_ms: u64,
    pub timeout_secs: u64,
}

impl RunConfig {
    /// Reject schedules that would poll without pausing or never wait at all.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.poll_initial_ms == 0 {
            return Err(config::ConfigError::Message(
                "run.poll_initial_ms must be at least 1".to_string(),
            ));
        }
        if self.poll_max_ms < self.poll_initial_ms {
            return Err(config::ConfigError::Message(format!(
                "run.poll_max_ms ({}) must not be below run.poll_initial_ms ({})",
                self.poll_max_ms, self.poll_initial_ms
            )));
        }
        if self.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "run.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            initial_interval: Duration::from_millis(self.poll_initial_ms),
            max_interval: Duration::from_millis(self.poll_max_ms),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub json: bool,
}

fn default_assistants() -> Vec<AssistantEntry> {
    vec![AssistantEntry {
        name: "BankTest".to_string(),
        id: "asst_hBTqaeCRW8LwY5iG2r8GBEVu".to_string(),
    }]
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.static_dir", "static")?
            .set_default("openai.base_url", "https://api.openai.com/v1")?
            .set_default("run.poll_initial_ms", 250)?
            .set_default("run.poll_max_ms", 2000)?
            .set_default("run.timeout_secs", 120)?
            .set_default("log.json", false)?;

        // 2. Config file: explicit path, else ./config.yaml when present
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));
        }

        // 3. Prefixed environment, e.g. RELAY_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("RELAY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. The upstream credential keeps its conventional name
        if let Ok(key) = env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                builder = builder.set_override("openai.api_key", key)?;
            }
        }

        // 5. CLI flags (and the env vars clap maps onto them) win
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(dir) = cli.static_dir {
            builder = builder.set_override("server.static_dir", dir)?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("log.json", json)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.run.validate()?;
        Ok(cfg)
    }

    /// The upstream API key; the server refuses to start without one.
    pub fn require_api_key(&self) -> Result<&str, config::ConfigError> {
        self.openai
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                config::ConfigError::Message(
                    "missing OpenAI API key: set OPENAI_API_KEY".to_string(),
                )
            })
    }

    /// Socket address string the listener binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
