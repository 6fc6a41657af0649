//! Factory methods for creating test data.
//!
//! This module provides factory methods for creating test entities with sensible defaults,
//! reducing boilerplate in tests.
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), sea_orm::DbErr> {
//!     let db = /* ... */;
//!
//!     // Member of a guild with the default 1000 coins
//!     let balance = factory::create_balance(&db).await?;
//!
//!     // Member with a custom wallet
//!     let broke = factory::balance::BalanceFactory::new(&db)
//!         .user_id(42)
//!         .guild_id(7)
//!         .coins(5)
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Available Factories
//!
//! - `balance` - Create ledger rows
//! - `game_restriction` - Create restriction gate rows
//! - `helpers` - Unique id generation shared by factories

pub mod balance;
pub mod game_restriction;
pub mod helpers;

pub use balance::{create_balance, create_balance_with_coins};
pub use game_restriction::create_restriction;
