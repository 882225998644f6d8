//! The `startauction` slash command

use serenity::all::{
    ChannelId, CommandInteraction, CommandOptionType, CreateCommand, CreateCommandOption,
    Permissions, ResolvedValue,
};

pub const START_AUCTION: &str = "startauction";
const CHANNEL_OPTION: &str = "channel";

pub fn register() -> CreateCommand {
    CreateCommand::new(START_AUCTION)
        .description("Start the player auction in a channel")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .dm_permission(false)
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Channel,
                CHANNEL_OPTION,
                "Channel to run the auction in",
            )
            .required(true),
        )
}

/// Channel picked by the invoker, falling back to where the command was used
pub fn target_channel(command: &CommandInteraction) -> ChannelId {
    command
        .data
        .options()
        .into_iter()
        .find_map(|option| match option.value {
            ResolvedValue::Channel(channel) if option.name == CHANNEL_OPTION => Some(channel.id),
            _ => None,
        })
        .unwrap_or(command.channel_id)
}

/// Whether the invoking member holds administrator permissions
pub fn invoked_by_admin(command: &CommandInteraction) -> bool {
    command
        .member
        .as_ref()
        .and_then(|member| member.permissions)
        .is_some_and(|permissions| permissions.administrator())
}
