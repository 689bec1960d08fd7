use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub discord: DiscordConfig,
    pub ranking: RankingConfig,
    pub roster: RosterConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// REST API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Gateway WebSocket URL
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    /// Command prefix (e.g. "!")
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// File holding the bot token; DISCORD_TOKEN env overrides
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    /// Primary MMR endpoint; account id is appended to the path
    #[serde(default = "default_primary_url")]
    pub primary_url: String,
    /// Fallback endpoint; account id is passed as the `wallet` query param
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    /// Roster JSON file; when unset the roster is in-memory only
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=10&encoding=json".to_string()
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_token_file() -> PathBuf {
    PathBuf::from("TOKEN.txt")
}

fn default_primary_url() -> String {
    "https://game-api.axie.technology/mmr".to_string()
}

fn default_fallback_url() -> String {
    "https://axiesworld.firebaseapp.com/updateSpecific".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("discord.api_base", default_api_base())?
            .set_default("discord.gateway_url", default_gateway_url())?
            .set_default("discord.prefix", default_prefix())?
            .set_default("discord.token_file", "TOKEN.txt")?
            .set_default("ranking.primary_url", default_primary_url())?
            .set_default("ranking.fallback_url", default_fallback_url())?
            .set_default("ranking.timeout_secs", default_timeout_secs())?
            .set_default("roster.path", "config.json")?
            .set_default("logging.level", "info")?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Override with environment variables (SCHOLARBOT_DISCORD__PREFIX, etc.)
            .add_source(
                Environment::with_prefix("SCHOLARBOT")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Resolve the bot token: DISCORD_TOKEN env wins, else first line of the token file.
    pub fn bot_token(&self) -> crate::error::Result<String> {
        if let Ok(token) = std::env::var("DISCORD_TOKEN") {
            let token = token.trim().to_string();
            if !token.is_empty() {
                return Ok(token);
            }
        }
        let raw = std::fs::read_to_string(&self.discord.token_file)?;
        let token = raw.lines().next().unwrap_or("").trim().to_string();
        if token.is_empty() {
            return Err(crate::error::BotError::Internal(format!(
                "no token found in {}",
                self.discord.token_file.display()
            )));
        }
        Ok(token)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.discord.prefix.is_empty() {
            errors.push("discord.prefix must not be empty".to_string());
        }

        if url::Url::parse(&self.ranking.primary_url).is_err() {
            errors.push(format!(
                "ranking.primary_url is not a valid URL: {}",
                self.ranking.primary_url
            ));
        }

        if url::Url::parse(&self.ranking.fallback_url).is_err() {
            errors.push(format!(
                "ranking.fallback_url is not a valid URL: {}",
                self.ranking.fallback_url
            ));
        }

        if self.ranking.timeout_secs == 0 {
            errors.push("ranking.timeout_secs must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::load_from("does-not-exist").expect("defaults load");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.discord.prefix, "!");
        assert_eq!(cfg.roster.path.as_deref(), Some(Path::new("config.json")));
    }

    #[test]
    fn empty_prefix_rejected() {
        let mut cfg = AppConfig::load_from("does-not-exist").unwrap();
        cfg.discord.prefix.clear();
        let errs = cfg.validate().unwrap_err();
        assert!(errs.iter().any(|e| e.contains("prefix")));
    }
}
