//! SeaORM entity models for the casino bot database.

pub mod prelude;

pub mod balance;
pub mod game_restriction;
