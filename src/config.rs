use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

pub type SharedConfig = Arc<RwLock<Config>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Logging
    pub log_level: String,

    // Settlement weeks are cut in this zone unless the club sets its own
    pub timezone: String,

    // Display
    pub currency_symbol: String,

    // Fail a player's settlement instead of paying 0% when a dynamic tier is missing
    pub strict_tiers: bool,

    // Used when a club profile carries no action percentage
    pub default_action_percentage: Decimal,

    // Accept rule tables that leave part of the ratio domain without a tier
    pub allow_coverage_gaps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            currency_symbol: "R$".to_string(),
            strict_tiers: false,
            default_action_percentage: Decimal::ZERO,
            allow_coverage_gaps: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let defaults = Config::default();

        Config {
            log_level: env("LOG_LEVEL", &defaults.log_level),
            timezone: env("SETTLEMENT_TZ", &defaults.timezone),
            currency_symbol: env("CURRENCY_SYMBOL", &defaults.currency_symbol),
            strict_tiers: env("STRICT_TIERS", "false").to_lowercase() == "true",
            default_action_percentage: env("DEFAULT_ACTION_PCT", "0")
                .parse()
                .unwrap_or(Decimal::ZERO),
            allow_coverage_gaps: env("ALLOW_COVERAGE_GAPS", "false").to_lowercase() == "true",
        }
    }

    /// Parsed settlement zone; UTC when the name is unknown.
    pub fn timezone(&self) -> Tz {
        parse_timezone(&self.timezone)
    }

    pub fn shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}

pub fn parse_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        warn!("Unknown time zone '{}', falling back to UTC", name);
        Tz::UTC
    })
}
