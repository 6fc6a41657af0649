//! Domain models and parameter types.
//!
//! Domain models are converted from entity models at the repository boundary, keeping
//! string-encoded Discord IDs and SeaORM types out of the service and engine layers.

pub mod balance;
pub mod game;
pub mod restriction;
