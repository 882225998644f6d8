//! Serenity event handler

use std::sync::Arc;

use gavel_core::{
    AuctionEngine, BidGateway, ChannelId, GatewayOutcome, InboundMessage, MessageId, RoleId,
    StartCommand, UserId, start_auction, start_reply,
};
use serenity::all::{
    CommandInteraction, Context, EditInteractionResponse, EventHandler, GuildId, Interaction,
    Message, Ready,
};
use serenity::async_trait;
use tracing::{debug, error, info, warn};

use super::commands::{self, START_AUCTION};

pub struct Handler {
    engine: AuctionEngine,
    gateway: Arc<BidGateway>,
    guild: GuildId,
}

impl Handler {
    pub fn new(engine: AuctionEngine, gateway: Arc<BidGateway>, guild: GuildId) -> Self {
        Self {
            engine,
            gateway,
            guild,
        }
    }

    async fn start_auction(&self, ctx: &Context, command: &CommandInteraction) {
        if let Err(e) = command.defer_ephemeral(ctx).await {
            warn!(error = %e, "Failed to acknowledge startauction");
            return;
        }

        let channel = ChannelId(commands::target_channel(command).get());
        let request = StartCommand {
            channel,
            invoker: UserId(command.user.id.get()),
            invoker_is_admin: commands::invoked_by_admin(command),
        };
        let result = start_auction(&self.engine, request).await;
        if let Err(e) = &result {
            info!(channel = %channel, reason = %e, "Start rejected");
        }

        let reply = EditInteractionResponse::new().content(start_reply(&result, channel));
        if let Err(e) = command.edit_response(ctx, reply).await {
            warn!(error = %e, "Failed to answer startauction");
        }
    }
}

/// Platform-neutral view of a guild message
fn inbound(msg: &Message) -> InboundMessage {
    InboundMessage {
        id: MessageId(msg.id.get()),
        channel: ChannelId(msg.channel_id.get()),
        author: UserId(msg.author.id.get()),
        author_is_bot: msg.author.bot,
        author_roles: msg
            .member
            .as_ref()
            .map(|member| member.roles.iter().map(|role| RoleId(role.get())).collect())
            .unwrap_or_default(),
        content: msg.content.clone(),
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guild = %self.guild, "Connected to Discord");

        match self
            .guild
            .set_commands(&ctx.http, vec![commands::register()])
            .await
        {
            Ok(registered) => info!(count = registered.len(), "Registered slash commands"),
            Err(e) => error!(error = %e, "Failed to register slash commands"),
        }
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        if msg.guild_id != Some(self.guild) {
            return;
        }

        match self.gateway.handle(&inbound(&msg)).await {
            Ok(GatewayOutcome::Ignored) => {}
            Ok(outcome) => debug!(message = %msg.id, outcome = ?outcome, "Bid handled"),
            Err(e) => error!(message = %msg.id, error = %e, "Bid could not reach the engine"),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction
            && command.data.name == START_AUCTION
        {
            self.start_auction(&ctx, &command).await;
        }
    }
}
