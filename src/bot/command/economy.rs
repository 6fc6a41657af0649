use chrono::Utc;
use serenity::all::CreateCommand;

use crate::{
    error::AppError,
    model::{balance::DailyClaim, game::PlayContext},
    service::economy::EconomyService,
    state::AppState,
};

const LEADERBOARD_SIZE: u64 = 10;

pub fn register() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("balance").description("Show your coins"),
        CreateCommand::new("daily").description("Claim your daily coins"),
        CreateCommand::new("leaderboard").description("Richest members of this server"),
    ]
}

pub async fn balance(state: &AppState, ctx: PlayContext) -> Result<String, AppError> {
    let balance = EconomyService::new(&state.db).balance(ctx.wallet()).await?;

    Ok(format!(
        "You have **{}** coins ({} earned in total).",
        balance.coins, balance.total_earned
    ))
}

pub async fn daily(state: &AppState, ctx: PlayContext) -> Result<String, AppError> {
    let claim = EconomyService::new(&state.db)
        .claim_daily(ctx.wallet(), state.daily_reward, Utc::now())
        .await?;

    Ok(match claim {
        DailyClaim::Claimed { reward, balance } => format!(
            "You claimed **{}** coins. Balance: **{}**.",
            reward, balance.coins
        ),
        DailyClaim::NotReady { next_claim_at } => format!(
            "You already claimed today. Come back <t:{}:R>.",
            next_claim_at.timestamp()
        ),
    })
}

pub async fn leaderboard(state: &AppState, ctx: PlayContext) -> Result<String, AppError> {
    let top = EconomyService::new(&state.db)
        .leaderboard(ctx.guild_id, LEADERBOARD_SIZE)
        .await?;

    if top.is_empty() {
        return Ok("Nobody has played yet.".to_string());
    }

    let lines: Vec<String> = top
        .iter()
        .enumerate()
        .map(|(rank, balance)| format!("{}. <@{}> {}", rank + 1, balance.user_id, balance.coins))
        .collect();

    Ok(format!("**Leaderboard**\n{}", lines.join("\n")))
}
