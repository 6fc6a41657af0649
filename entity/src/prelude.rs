pub use super::balance::Entity as Balance;
pub use super::game_restriction::Entity as GameRestriction;
