use std::path::PathBuf;
use std::time::Duration;

use gavel_core::{Amount, AuctionConfig};
use serde::{Deserialize, Serialize};

/// Default SQLite database for teams and players
pub const DEFAULT_LEDGER_PATH: &str = "stats.db";
/// Default environment variable holding the bot token
pub const DEFAULT_TOKEN_ENV: &str = "BOT_TOKEN";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawGavelConfig {
    #[serde(default)]
    pub auction: RawAuctionSection,

    #[serde(default)]
    pub ledger: RawLedgerSection,

    #[serde(default)]
    pub discord: RawDiscordSection,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAuctionSection {
    #[serde(default, with = "humantime_serde::option")]
    pub countdown: Option<Duration>,
    pub starting_budget: Option<Amount>,
    pub reset_budgets_on_start: Option<bool>,
    pub reset_pool_on_start: Option<bool>,
    pub bid_prefix: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLedgerSection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDiscordSection {
    pub guild_id: Option<u64>,
    pub token_env: Option<String>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GavelConfig {
    #[serde(default)]
    pub auction: AuctionConfig,

    #[serde(default)]
    pub ledger: LedgerSection,

    #[serde(default)]
    pub discord: DiscordSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSection {
    /// SQLite database file
    pub path: PathBuf,
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LEDGER_PATH),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordSection {
    /// Guild the slash command is registered in
    pub guild_id: Option<u64>,

    /// Environment variable the bot token is read from
    pub token_env: String,
}

impl Default for DiscordSection {
    fn default() -> Self {
        Self {
            guild_id: None,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = GavelConfig::default();
        assert_eq!(config.auction.countdown, Duration::from_secs(15));
        assert_eq!(config.auction.starting_budget, 145_000_000);
        assert_eq!(config.ledger.path, PathBuf::from("stats.db"));
        assert_eq!(config.discord.token_env, "BOT_TOKEN");
        assert!(config.discord.guild_id.is_none());
    }

    #[test]
    fn test_raw_config_partial_parsing() {
        let toml_str = r#"
[auction]
countdown = "20s"

[discord]
guild_id = 1234
"#;
        let raw: RawGavelConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(raw.auction.countdown, Some(Duration::from_secs(20)));
        assert!(raw.auction.starting_budget.is_none());
        assert!(raw.auction.bid_prefix.is_none());
        assert_eq!(raw.discord.guild_id, Some(1234));
        assert!(raw.discord.token_env.is_none());
        assert!(raw.ledger.path.is_none());
    }

    #[test]
    fn test_final_config_serializes_countdown_as_text() {
        let toml_str = toml::to_string(&GavelConfig::default()).unwrap();
        assert!(toml_str.contains("countdown = \"15s\""));
        assert!(toml_str.contains("path = \"stats.db\""));
    }
}
