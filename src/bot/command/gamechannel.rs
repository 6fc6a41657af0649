//! `/gamechannel`: limit games to specific channels. Requires Manage Server.

use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption, Permissions};

use super::{subcommand, Options};
use crate::{
    error::{game::GameError, AppError},
    model::game::{GameKind, PlayContext},
    service::restriction::RestrictionService,
    state::AppState,
};

fn game_option() -> CreateCommandOption {
    let mut option = CreateCommandOption::new(CommandOptionType::String, "game", "Game to restrict")
        .required(true);
    for game in GameKind::ALL {
        option = option.add_string_choice(game.as_str(), game.as_str());
    }
    option
}

fn channel_option() -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::Channel, "channel", "Text channel").required(true)
}

pub fn register() -> CreateCommand {
    CreateCommand::new("gamechannel")
        .description("Limit games to specific channels")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .add_option(
            subcommand("add", "Allow a game in a channel")
                .add_sub_option(game_option())
                .add_sub_option(channel_option()),
        )
        .add_option(
            subcommand("remove", "Stop allowing a game in a channel")
                .add_sub_option(game_option())
                .add_sub_option(channel_option()),
        )
        .add_option(subcommand("list", "Show channel restrictions"))
}

pub async fn run(
    state: &AppState,
    ctx: PlayContext,
    options: Options<'_>,
) -> Result<String, AppError> {
    let gate = RestrictionService::new(&state.db);
    let (name, options) = options.subcommand()?;

    match name {
        "add" => {
            let game: GameKind = options.string("game")?.parse()?;
            let channel_id = options.channel("channel")?;

            if gate.allow_channel(ctx.guild_id, game, channel_id).await? {
                Ok(format!("**{game}** can now be played in <#{channel_id}>."))
            } else {
                Ok(format!("**{game}** is already allowed in <#{channel_id}>."))
            }
        }
        "remove" => {
            let game: GameKind = options.string("game")?.parse()?;
            let channel_id = options.channel("channel")?;

            if !gate.remove_channel(ctx.guild_id, game, channel_id).await? {
                return Ok(format!("**{game}** wasn't limited to <#{channel_id}>."));
            }
            let remaining = gate
                .list_channels(ctx.guild_id)
                .await?
                .into_iter()
                .filter(|restriction| restriction.game == game)
                .count();

            if remaining == 0 {
                Ok(format!("**{game}** can now be played in any channel."))
            } else {
                Ok(format!("**{game}** is no longer allowed in <#{channel_id}>."))
            }
        }
        "list" => {
            let restrictions = gate.list_channels(ctx.guild_id).await?;
            if restrictions.is_empty() {
                return Ok("Every game can be played in any channel.".to_string());
            }

            let lines: Vec<String> = GameKind::ALL
                .into_iter()
                .filter_map(|game| {
                    let channels: Vec<String> = restrictions
                        .iter()
                        .filter(|restriction| restriction.game == game)
                        .map(|restriction| format!("<#{}>", restriction.channel_id))
                        .collect();
                    (!channels.is_empty()).then(|| format!("**{}**: {}", game, channels.join(" ")))
                })
                .collect();

            Ok(lines.join("\n"))
        }
        _ => Err(GameError::invalid("Unknown gamechannel action.").into()),
    }
}
