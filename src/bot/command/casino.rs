use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption};

use super::{bet_option, signed, BetLimits, Options};
use crate::{
    engine::casino::{CasinoBet, CasinoDraw},
    error::{game::GameError, AppError},
    model::game::PlayContext,
    service::casino::{CasinoPlay, CasinoService},
    state::AppState,
};

pub const COINFLIP_LIMITS: BetLimits = BetLimits::new(10, 1000);
pub const DICE_LIMITS: BetLimits = BetLimits::new(10, 1000);
pub const SLOTS_LIMITS: BetLimits = BetLimits::new(10, 500);
pub const ROULETTE_LIMITS: BetLimits = BetLimits::new(10, 1000);
pub const WHEEL_LIMITS: BetLimits = BetLimits::new(10, 500);

pub fn register() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("coinflip")
            .description("Call heads or tails, double or nothing")
            .add_option(bet_option(COINFLIP_LIMITS))
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "side", "Heads or tails")
                    .required(true)
                    .add_string_choice("Heads", "heads")
                    .add_string_choice("Tails", "tails"),
            ),
        CreateCommand::new("dice")
            .description("Guess the roll of a die for 5x")
            .add_option(bet_option(DICE_LIMITS))
            .add_option(
                CreateCommandOption::new(CommandOptionType::Integer, "guess", "Face from 1 to 6")
                    .required(true),
            ),
        CreateCommand::new("slots")
            .description("Spin three reels")
            .add_option(bet_option(SLOTS_LIMITS)),
        CreateCommand::new("roulette")
            .description("Bet on red, black (2x) or a single number (36x)")
            .add_option(bet_option(ROULETTE_LIMITS))
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "call",
                    "red, black or a number from 0 to 36",
                )
                .required(true),
            ),
        CreateCommand::new("wheel")
            .description("Spin the wheel of fortune")
            .add_option(bet_option(WHEEL_LIMITS)),
    ]
}

pub async fn run(
    state: &AppState,
    ctx: PlayContext,
    name: &str,
    options: Options<'_>,
) -> Result<String, AppError> {
    let (call, limits) = match name {
        "coinflip" => (
            CasinoBet::Coinflip(options.string("side")?.parse()?),
            COINFLIP_LIMITS,
        ),
        "dice" => {
            let guess = u8::try_from(options.integer("guess")?)
                .map_err(|_| GameError::invalid("Guess a number from 1 to 6."))?;
            (CasinoBet::Dice(guess), DICE_LIMITS)
        }
        "slots" => (CasinoBet::Slots, SLOTS_LIMITS),
        "roulette" => (
            CasinoBet::Roulette(options.string("call")?.parse()?),
            ROULETTE_LIMITS,
        ),
        _ => (CasinoBet::Wheel, WHEEL_LIMITS),
    };
    let bet = options.bet(limits)?;

    let play = CasinoService::new(&state.db).play(ctx, bet, call).await?;

    Ok(describe(&play))
}

fn describe_draw(draw: &CasinoDraw) -> String {
    match draw {
        CasinoDraw::Coin(side) => format!("The coin landed on **{side}**."),
        CasinoDraw::Die(face) => format!("The die rolled **{face}**."),
        CasinoDraw::Reels(reels) => {
            let symbols: Vec<&str> = reels.iter().map(|symbol| symbol.emoji()).collect();
            format!("[ {} ]", symbols.join(" | "))
        }
        CasinoDraw::Pocket { number, color } => {
            format!("The ball landed on **{number} {color}**.")
        }
        CasinoDraw::Segment(name) => format!("The wheel stopped on **{name}**."),
    }
}

fn describe(play: &CasinoPlay) -> String {
    let result = if play.outcome.payout > 0 {
        format!("You won **{}** coins", play.outcome.payout)
    } else {
        "You lost".to_string()
    };

    format!(
        "{}\n{} ({}). Balance: **{}**.",
        describe_draw(&play.outcome.draw),
        result,
        signed(play.net()),
        play.balance
    )
}
