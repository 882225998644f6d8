use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gavel_core::AuctionConfig;

use super::types::{
    DEFAULT_LEDGER_PATH, DEFAULT_TOKEN_ENV, DiscordSection, GavelConfig, LedgerSection,
    RawAuctionSection, RawDiscordSection, RawGavelConfig, RawLedgerSection,
};
use crate::paths;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<GavelConfig> {
        let mut raw = RawGavelConfig::default();

        // Layer 1: User config
        let user_path = Self::user_config_path();
        if user_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        Ok(Self::finalize(raw))
    }

    /// Get user config path (`$XDG_CONFIG_HOME/gavel/config.toml`)
    pub fn user_config_path() -> PathBuf {
        paths::config_dir().join("config.toml")
    }

    /// Get project config path
    /// Can be overridden with GAVEL_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("GAVEL_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".gavel/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<RawGavelConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawGavelConfig, overlay: RawGavelConfig) -> RawGavelConfig {
        RawGavelConfig {
            auction: RawAuctionSection {
                countdown: overlay.auction.countdown.or(base.auction.countdown),
                starting_budget: overlay
                    .auction
                    .starting_budget
                    .or(base.auction.starting_budget),
                reset_budgets_on_start: overlay
                    .auction
                    .reset_budgets_on_start
                    .or(base.auction.reset_budgets_on_start),
                reset_pool_on_start: overlay
                    .auction
                    .reset_pool_on_start
                    .or(base.auction.reset_pool_on_start),
                bid_prefix: overlay.auction.bid_prefix.or(base.auction.bid_prefix),
            },
            ledger: RawLedgerSection {
                path: overlay.ledger.path.or(base.ledger.path),
            },
            discord: RawDiscordSection {
                guild_id: overlay.discord.guild_id.or(base.discord.guild_id),
                token_env: overlay.discord.token_env.or(base.discord.token_env),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawGavelConfig) -> GavelConfig {
        let defaults = AuctionConfig::default();
        GavelConfig {
            auction: AuctionConfig {
                countdown: raw.auction.countdown.unwrap_or(defaults.countdown),
                starting_budget: raw
                    .auction
                    .starting_budget
                    .unwrap_or(defaults.starting_budget),
                reset_budgets_on_start: raw
                    .auction
                    .reset_budgets_on_start
                    .unwrap_or(defaults.reset_budgets_on_start),
                reset_pool_on_start: raw
                    .auction
                    .reset_pool_on_start
                    .unwrap_or(defaults.reset_pool_on_start),
                bid_prefix: raw.auction.bid_prefix.unwrap_or(defaults.bid_prefix),
            },
            ledger: LedgerSection {
                path: raw
                    .ledger
                    .path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_PATH)),
            },
            discord: DiscordSection {
                guild_id: raw.discord.guild_id,
                token_env: raw
                    .discord
                    .token_env
                    .unwrap_or_else(|| DEFAULT_TOKEN_ENV.to_string()),
            },
        }
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<GavelConfig> {
        if path.exists() {
            Ok(Self::finalize(Self::read_raw(path)?))
        } else {
            Ok(GavelConfig::default())
        }
    }
}
