use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption};

use super::{bet_option, subcommand, BetLimits, Options};
use crate::{
    engine::hilo::{Guess, HiLoPhase},
    error::{game::GameError, AppError},
    model::game::PlayContext,
    service::hilo::HiLoService,
    state::AppState,
};

pub const LIMITS: BetLimits = BetLimits::new(25, 500);

pub fn register() -> CreateCommand {
    CreateCommand::new("hilo")
        .description("Guess whether the next card is higher or lower")
        .add_option(
            subcommand("start", "Turn over the first card").add_sub_option(bet_option(LIMITS)),
        )
        .add_option(
            subcommand("guess", "Guess the next card").add_sub_option(
                CreateCommandOption::new(CommandOptionType::String, "guess", "Your guess")
                    .required(true)
                    .add_string_choice("Higher", "higher")
                    .add_string_choice("Lower", "lower")
                    .add_string_choice("Equal", "equal"),
            ),
        )
        .add_option(subcommand("cashout", "Take your winnings"))
}

pub async fn run(
    state: &AppState,
    ctx: PlayContext,
    options: Options<'_>,
) -> Result<String, AppError> {
    let service = HiLoService::new(&state.db, &state.hilo);
    let (name, options) = options.subcommand()?;

    match name {
        "start" => {
            let game = service.start(ctx, options.bet(LIMITS)?).await?;
            Ok(format!(
                "The card is **{}**. Higher, lower or equal?",
                game.current()
            ))
        }
        "guess" => {
            let guess: Guess = options.string("guess")?.parse()?;
            let result = service.guess(ctx, guess).await?;

            if result.correct {
                Ok(format!(
                    "{} → **{}**. Correct! Streak {}, cash out now for **{}** coins.",
                    result.previous, result.drawn, result.streak, result.winnings
                ))
            } else {
                Ok(format!(
                    "{} → **{}**. Wrong guess, you lost your bet.",
                    result.previous, result.drawn
                ))
            }
        }
        "cashout" => {
            let game = service.cash_out(ctx).await?;
            let payout = match game.phase() {
                HiLoPhase::CashedOut { payout } => payout,
                _ => 0,
            };
            Ok(format!(
                "You cashed out after {} correct guesses for **{}** coins.",
                game.streak(),
                payout
            ))
        }
        _ => Err(GameError::invalid("Unknown hi-lo action.").into()),
    }
}
