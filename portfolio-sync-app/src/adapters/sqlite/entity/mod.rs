//! `SeaORM` entities.

pub mod account;
pub mod transaction;
