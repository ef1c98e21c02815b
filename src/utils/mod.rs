//! Crate-wide utilities.

pub mod error;
pub mod logging;

pub use error::{DispatchError, FetchError};
