use crate::{
    data::balance::BalanceRepository,
    error::AppError,
    model::balance::{Wallet, STARTING_COINS},
};
use entity::prelude::Balance;
use test_utils::{builder::TestBuilder, factory};

mod adjust;
mod claim_daily;
mod get_or_create;
mod top_by_coins;
