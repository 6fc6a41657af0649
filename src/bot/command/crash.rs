use serenity::all::CreateCommand;

use super::{bet_option, subcommand, BetLimits, Options};
use crate::{
    engine::crash::CrashPhase,
    error::{game::GameError, AppError},
    model::game::PlayContext,
    service::crash::CrashSnapshot,
    state::AppState,
};

pub const LIMITS: BetLimits = BetLimits::new(50, 2000);

pub fn register() -> CreateCommand {
    CreateCommand::new("crash")
        .description("Ride the multiplier and cash out before it crashes")
        .add_option(subcommand("join", "Join the next round").add_sub_option(bet_option(LIMITS)))
        .add_option(subcommand("leave", "Leave a round before it starts"))
        .add_option(subcommand("start", "Start the round now"))
        .add_option(subcommand("cashout", "Cash out at the current multiplier"))
        .add_option(subcommand("status", "Show the current round"))
}

pub async fn run(
    state: &AppState,
    ctx: PlayContext,
    options: Options<'_>,
) -> Result<String, AppError> {
    let crash = &state.crash;
    let (name, options) = options.subcommand()?;

    match name {
        "join" => {
            let bet = options.bet(LIMITS)?;
            let snapshot = crash.join(ctx, bet).await?;
            Ok(format!(
                "You joined the crash round for **{}** coins. {}",
                bet,
                describe(&snapshot)
            ))
        }
        "leave" => {
            let refund = crash.leave(ctx).await?;
            Ok(format!("You left the round. **{refund}** coins refunded."))
        }
        "start" => {
            let snapshot = crash.start(ctx).await?;
            Ok(format!("Round started! {}", describe(&snapshot)))
        }
        "cashout" => {
            let cash_out = crash.cash_out(ctx).await?;
            Ok(format!(
                "You cashed out at **{:.2}x** for **{}** coins.",
                cash_out.multiplier, cash_out.payout
            ))
        }
        "status" => Ok(match crash.status(ctx.guild_id).await {
            Some(snapshot) => describe(&snapshot),
            None => "No crash round is open. Start one with `/crash join`.".to_string(),
        }),
        _ => Err(GameError::invalid("Unknown crash action.").into()),
    }
}

fn describe(snapshot: &CrashSnapshot) -> String {
    let phase = match snapshot.phase {
        CrashPhase::Waiting => "Waiting for players".to_string(),
        CrashPhase::Running => format!("Running at **{:.2}x**", snapshot.multiplier),
        CrashPhase::Crashed => format!("Crashed at **{:.2}x**", snapshot.multiplier),
    };

    format!(
        "{}: {} player(s), {} coins in play.",
        phase, snapshot.players, snapshot.pot
    )
}
