//! Types shared by the billing client crates

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
