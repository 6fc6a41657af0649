use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption};

use super::{subcommand, Options};
use crate::{
    engine::rps::{DuelOutcome, RpsChoice, RpsResult, SoloOutcome},
    error::{game::GameError, AppError},
    model::game::PlayContext,
    service::rps::RpsService,
    state::AppState,
};

fn choice_option() -> CreateCommandOption {
    let mut option =
        CreateCommandOption::new(CommandOptionType::String, "choice", "Your move").required(true);
    for choice in RpsChoice::ALL {
        option = option.add_string_choice(choice.to_string(), choice.to_string());
    }
    option
}

pub fn register() -> CreateCommand {
    CreateCommand::new("rps")
        .description("Rock, paper, scissors")
        .add_option(subcommand("play", "Open a round against the bot"))
        .add_option(
            subcommand("throw", "Make your move against the bot").add_sub_option(choice_option()),
        )
        .add_option(
            subcommand("challenge", "Challenge another member")
                .add_sub_option(
                    CreateCommandOption::new(CommandOptionType::User, "opponent", "Who to challenge")
                        .required(true),
                )
                .add_sub_option(choice_option()),
        )
        .add_option(
            subcommand("accept", "Accept a challenge")
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::User,
                        "challenger",
                        "Who challenged you",
                    )
                    .required(true),
                )
                .add_sub_option(choice_option()),
        )
}

pub async fn run(
    state: &AppState,
    ctx: PlayContext,
    options: Options<'_>,
) -> Result<String, AppError> {
    let service = RpsService::new(
        &state.db,
        &state.rps_solo,
        &state.rps_challenges,
        &state.rps_cooldowns,
    );
    let (name, options) = options.subcommand()?;

    match name {
        "play" => {
            service.start_solo(ctx).await?;
            Ok("I've picked my move. Use `/rps throw` to make yours!".to_string())
        }
        "throw" => {
            let choice: RpsChoice = options.string("choice")?.parse()?;
            let outcome = service.throw(ctx, choice).await?;
            Ok(describe_solo(&outcome))
        }
        "challenge" => {
            let opponent = options.user("opponent")?;
            let choice: RpsChoice = options.string("choice")?.parse()?;
            service.challenge(ctx, opponent, choice).await?;
            Ok(format!(
                "<@{}> challenged <@{}> to rock, paper, scissors! Answer with `/rps accept`.",
                ctx.user_id, opponent
            ))
        }
        "accept" => {
            let challenger = options.user("challenger")?;
            let choice: RpsChoice = options.string("choice")?.parse()?;
            let outcome = service.accept(ctx, challenger, choice).await?;
            Ok(describe_duel(challenger, ctx.user_id, &outcome))
        }
        _ => Err(GameError::invalid("Unknown rps action.").into()),
    }
}

fn describe_solo(outcome: &SoloOutcome) -> String {
    let verdict = match outcome.result {
        RpsResult::Win => format!("You win **{}** coins!", outcome.reward),
        RpsResult::Tie => format!("It's a tie. You get **{}** coins.", outcome.reward),
        RpsResult::Lose => "You lose.".to_string(),
    };

    format!(
        "{} vs {}\n{}",
        outcome.player.emoji(),
        outcome.bot.emoji(),
        verdict
    )
}

fn describe_duel(challenger: u64, opponent: u64, outcome: &DuelOutcome) -> String {
    let matchup = format!(
        "<@{}> {} vs {} <@{}>",
        challenger,
        outcome.challenger_choice.emoji(),
        outcome.opponent_choice.emoji(),
        opponent
    );

    let rewards: Vec<String> = outcome
        .rewards
        .iter()
        .map(|(user_id, reward)| format!("<@{user_id}> +{reward}"))
        .collect();

    match outcome.winner {
        Some(winner) => format!("{matchup}\n<@{winner}> wins! {}", rewards.join(", ")),
        None => format!("{matchup}\nIt's a tie! {}", rewards.join(", ")),
    }
}
