//! Run the auction bot on Discord

use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use gavel_core::{AuctionEngine, BidGateway};
use secrecy::{ExposeSecret, SecretString};
use serenity::all::{GatewayIntents, GuildId, Http};
use serenity::Client;
use tracing::{info, warn};

use super::open_ledger;
use crate::config::{ConfigLoader, GavelConfig};
use crate::discord::{DiscordNotifier, Handler};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Guild to serve (overrides discord.guild_id)
    #[arg(long)]
    pub guild: Option<u64>,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let guild = guild_id(args.guild.or(config.discord.guild_id))?;
    let token = bot_token(&config)?;

    let ledger = open_ledger(&config)?;
    let http = Arc::new(Http::new(token.expose_secret()));
    let notifier = Arc::new(DiscordNotifier::new(http, guild));

    let engine = AuctionEngine::spawn(ledger.clone(), notifier.clone(), config.auction.clone());
    let gateway = Arc::new(BidGateway::new(
        engine.clone(),
        ledger,
        notifier,
        config.auction.bid_prefix.clone(),
    ));

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(token.expose_secret(), intents)
        .event_handler(Handler::new(engine.clone(), gateway, guild))
        .await
        .context("Failed to create Discord client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
            shard_manager.shutdown_all().await;
        }
    });

    info!(guild = %guild, "Starting gavel");
    let result = client.start().await;

    if let Err(e) = engine.shutdown().await {
        warn!(error = %e, "Engine already stopped");
    }
    result.context("Discord connection failed")
}

fn guild_id(value: Option<u64>) -> Result<GuildId> {
    let Some(value) = value else {
        bail!("No guild configured; set discord.guild_id or pass --guild");
    };
    NonZeroU64::new(value)
        .map(GuildId::from)
        .context("Guild id must not be zero")
}

fn bot_token(config: &GavelConfig) -> Result<SecretString> {
    let var = &config.discord.token_env;
    let token = std::env::var(var).with_context(|| format!("Bot token not found in ${var}"))?;
    if token.trim().is_empty() {
        bail!("${var} is empty");
    }
    Ok(SecretString::from(token.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn guild_is_required_and_non_zero() {
        assert!(guild_id(None).is_err());
        assert!(guild_id(Some(0)).is_err());
        assert_eq!(guild_id(Some(42)).unwrap().get(), 42);
    }

    #[test]
    #[serial]
    fn token_is_read_from_the_configured_variable() {
        let mut config = GavelConfig::default();
        config.discord.token_env = "GAVEL_TEST_TOKEN_READ".to_string();
        unsafe {
            std::env::set_var("GAVEL_TEST_TOKEN_READ", " secret-token \n");
        }

        let token = bot_token(&config).unwrap();

        assert_eq!(token.expose_secret(), "secret-token");
        unsafe {
            std::env::remove_var("GAVEL_TEST_TOKEN_READ");
        }
    }

    #[test]
    #[serial]
    fn missing_token_is_an_error() {
        let mut config = GavelConfig::default();
        config.discord.token_env = "GAVEL_TEST_TOKEN_MISSING".to_string();

        let err = bot_token(&config).unwrap_err();

        assert!(err.to_string().contains("GAVEL_TEST_TOKEN_MISSING"));
    }
}
