//! Process configuration read from the environment.

use anyhow::{Context, bail};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEV_JWT_SECRET: &str = "dev-secret";

/// Which `BlogStore` implementation backs the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres { url: String, max_connections: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub store: StoreConfig,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let persistent = match lookup("USE_PERSISTENT_STORES") {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("USE_PERSISTENT_STORES: invalid boolean {raw:?}"))?,
            None => false,
        };

        let store = if persistent {
            let Some(url) = lookup("DATABASE_URL") else {
                bail!("DATABASE_URL must be set when USE_PERSISTENT_STORES is enabled");
            };
            let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
                Some(raw) => raw
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("DATABASE_MAX_CONNECTIONS: invalid number {raw:?}"))?,
                None => DEFAULT_MAX_CONNECTIONS,
            };
            StoreConfig::Postgres { url, max_connections }
        } else {
            StoreConfig::InMemory
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            store,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
