//! Drive an auction from the terminal
//!
//! Each stdin line is either a console command (`start`, `stop`, `status`)
//! or a chat message written as `<user_id> <text>`, routed through the same
//! gateway the Discord bot uses. Announcements go to the log.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use gavel_core::{
    AuctionEngine, BidGateway, ChannelId, GatewayOutcome, InboundMessage, LogNotifier, MessageId,
    StartCommand, UserId, format_amount, start_auction, start_reply,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use super::open_ledger;
use crate::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct ConsoleArgs {
    /// Channel id the auction runs in
    #[arg(long, default_value_t = 1)]
    pub channel: u64,
}

/// A parsed stdin line
#[derive(Debug, PartialEq, Eq)]
enum ConsoleLine<'a> {
    Start,
    Stop,
    Status,
    Chat { author: UserId, text: &'a str },
}

fn parse_line(line: &str) -> Option<ConsoleLine<'_>> {
    let line = line.trim();
    match line {
        "" => None,
        "start" => Some(ConsoleLine::Start),
        "stop" => Some(ConsoleLine::Stop),
        "status" => Some(ConsoleLine::Status),
        _ => {
            let (author, text) = line.split_once(char::is_whitespace)?;
            let author = author.parse().ok()?;
            Some(ConsoleLine::Chat {
                author: UserId(author),
                text: text.trim_start(),
            })
        }
    }
}

pub async fn run(args: ConsoleArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let channel = ChannelId(args.channel);
    let ledger = open_ledger(&config)?;
    let notifier = Arc::new(LogNotifier);

    let engine = AuctionEngine::spawn(ledger.clone(), notifier.clone(), config.auction.clone());
    let gateway = BidGateway::new(
        engine.clone(),
        ledger,
        notifier,
        config.auction.bid_prefix.clone(),
    );

    println!("Auction console on channel {channel}. Type `start`, `stop`, `status` or `<user_id> <message>`.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut next_message = 1u64;
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match parse_line(&line) {
            None => {
                if !line.trim().is_empty() {
                    println!("Expected `start`, `stop`, `status` or `<user_id> <message>`");
                }
            }
            Some(ConsoleLine::Start) => {
                let command = StartCommand {
                    channel,
                    invoker: UserId(0),
                    invoker_is_admin: true,
                };
                let result = start_auction(&engine, command).await;
                println!("{}", start_reply(&result, channel));
            }
            Some(ConsoleLine::Stop) => {
                engine.stop().await?;
                println!("Auction stopped");
            }
            Some(ConsoleLine::Status) => print_status(&engine).await?,
            Some(ConsoleLine::Chat { author, text }) => {
                let message = InboundMessage {
                    id: MessageId(next_message),
                    channel,
                    author,
                    author_is_bot: false,
                    author_roles: Vec::new(),
                    content: text.to_string(),
                };
                next_message += 1;
                match gateway.handle(&message).await {
                    Ok(GatewayOutcome::Ignored) => {}
                    Ok(outcome) => println!("{outcome:?}"),
                    Err(e) => warn!(error = %e, "Bid could not reach the engine"),
                }
            }
        }
    }

    engine.shutdown().await?;
    Ok(())
}

async fn print_status(engine: &AuctionEngine) -> Result<()> {
    let snapshot = engine.snapshot().await?;
    if !snapshot.active {
        println!("No auction running");
        return Ok(());
    }
    match (snapshot.current_item, snapshot.highest_bidder) {
        (Some(player), Some((bidder, team))) => println!(
            "<@{player}>: {} by <@{bidder}> ({team})",
            format_amount(snapshot.current_bid)
        ),
        (Some(player), None) => println!("<@{player}>: no bids yet"),
        (None, _) => println!("Waiting for the next player"),
    }
    Ok(())
}
