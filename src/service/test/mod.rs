use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::{error::AppError, model::game::PlayContext, service::economy::EconomyService};

mod blackjack;
mod minesweeper;
mod rps;

const GUILD: u64 = 1;
const CHANNEL: u64 = 10;

fn ctx(user_id: u64) -> PlayContext {
    PlayContext::new(user_id, GUILD, CHANNEL)
}

async fn coins(db: &DatabaseConnection, user_id: u64) -> Result<i64, AppError> {
    Ok(EconomyService::new(db).balance(ctx(user_id).wallet()).await?.coins)
}

/// Takes the ledger table offline so every balance read and write fails.
async fn take_ledger_offline(db: &DatabaseConnection) -> Result<(), AppError> {
    db.execute_unprepared("ALTER TABLE balance RENAME TO balance_offline")
        .await?;
    Ok(())
}

async fn bring_ledger_online(db: &DatabaseConnection) -> Result<(), AppError> {
    db.execute_unprepared("ALTER TABLE balance_offline RENAME TO balance")
        .await?;
    Ok(())
}
