//! Database repository layer.
//!
//! Repositories use SeaORM entity models internally and return domain models so the
//! service layer never handles string-encoded IDs. All ledger and restriction gate
//! queries go through these repositories.

pub mod balance;
pub mod restriction;

#[cfg(test)]
mod test;
