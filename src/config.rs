//! Application configuration.
//!
//! Values come from an optional YAML file (`BOT_CONFIG`, default
//! `config/config.yaml`) and are then overridden by environment variables,
//! which `dotenv` may have loaded from `.env`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::Path;

use crate::utils::AppError;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// `allowed_origins` entry that lets every origin through
pub const ANY_ORIGIN: &str = "*";

/// Full read/write access to the HTTP API
pub const TIER_ADMIN: u8 = 0;
/// GET requests only
pub const TIER_READ_ONLY: u8 = 1;
/// Any key that is missing or unknown
pub const TIER_NONE: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Mongodb,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub bot: BotConfig,

    /// api_key header value -> access tier
    #[serde(default)]
    pub api_keys: HashMap<String, u8>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins accepted by CORS
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == ANY_ORIGIN)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Used when the URL names no database
    #[serde(default = "default_database_name")]
    pub name: String,

    #[serde(default)]
    pub backend: StoreBackend,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            name: default_database_name(),
            backend: StoreBackend::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Bot token (or env var reference like ${DISCORD_TOKEN})
    #[serde(default)]
    pub token: Option<String>,

    /// Application id used to build invite links
    #[serde(default)]
    pub client_id: Option<String>,

    /// User id of the bot owner; accepted from any guild
    #[serde(default)]
    pub owner_id: Option<u64>,

    /// Guilds whose members may use the bot
    #[serde(default)]
    pub testing_guilds: Vec<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            token: None,
            client_id: None,
            owner_id: None,
            testing_guilds: Vec::new(),
        }
    }
}

impl BotConfig {
    /// Resolve bot token from environment if needed
    #[cfg_attr(not(feature = "discord"), allow(dead_code))]
    pub fn resolve_token(&self) -> Option<String> {
        self.token.as_ref().and_then(|token| {
            if token.starts_with("${") && token.ends_with('}') {
                env::var(&token[2..token.len() - 1]).ok()
            } else {
                Some(token.clone())
            }
        })
    }

    pub fn invite_link(&self) -> Option<String> {
        self.client_id.as_ref().map(|id| {
            format!(
                "Invite link: https://discordapp.com/oauth2/authorize?client_id={}&scope=bot",
                id
            )
        })
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3333
}

fn default_database_url() -> String {
    "mongodb://localhost:27017/bamboo_bot".to_string()
}

fn default_database_name() -> String {
    "bamboo_bot".to_string()
}

fn default_prefix() -> String {
    "!".to_string()
}

impl AppConfig {
    /// Reads the YAML file named by `BOT_CONFIG` and applies environment
    /// overrides.
    pub fn load() -> Result<Self, AppError> {
        let path = env::var("BOT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would only fail later, inside every server worker.
    pub fn validate(&self) -> Result<(), AppError> {
        for origin in &self.server.allowed_origins {
            if origin == ANY_ORIGIN {
                continue;
            }
            let valid = origin
                .parse::<actix_web::http::Uri>()
                .map(|uri| uri.scheme().is_some() && uri.host().is_some())
                .unwrap_or(false);
            if !valid {
                return Err(AppError::ConfigError(format!(
                    "allowed_origins entry is not an origin like https://example.com: {}",
                    origin
                )));
            }
        }
        Ok(())
    }

    /// A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            log::info!("ℹ️  No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::ConfigError(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml(&raw)
            .map_err(|e| AppError::ConfigError(format!("cannot parse {}: {}", path.display(), e)))
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| AppError::ConfigError(format!("PORT is not a valid port: {}", port)))?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(backend) = lookup("STORE_BACKEND") {
            self.database.backend = match backend.to_lowercase().as_str() {
                "mongodb" | "mongo" => StoreBackend::Mongodb,
                "memory" => StoreBackend::Memory,
                other => {
                    return Err(AppError::ConfigError(format!("unknown STORE_BACKEND: {}", other)))
                }
            };
        }
        if let Some(prefix) = lookup("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }
        if let Some(token) = lookup("DISCORD_TOKEN") {
            self.bot.token = Some(token);
        }
        if let Some(key) = lookup("ADMIN_API_KEY") {
            self.api_keys.insert(key, TIER_ADMIN);
        }
        if let Some(key) = lookup("READ_API_KEY") {
            self.api_keys.insert(key, TIER_READ_ONLY);
        }
        Ok(())
    }

    /// Access tier for an `api_key` header value
    pub fn access_tier(&self, api_key: Option<&str>) -> u8 {
        api_key
            .and_then(|key| self.api_keys.get(key).copied())
            .unwrap_or(TIER_NONE)
    }
}
