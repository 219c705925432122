//! Wire and domain types shared between the account client and its callers.

pub mod domain;
pub mod error;
pub mod protocol;
