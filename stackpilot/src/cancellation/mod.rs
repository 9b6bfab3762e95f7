//! Cooperative cancellation for stack operations.

mod token;

pub use token::CancellationToken;
