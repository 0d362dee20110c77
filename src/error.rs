//! Error types for realfolio
//!
//! This module defines domain-specific error types that provide clear,
//! actionable error messages to users.

use thiserror::Error;

/// Errors raised while loading and validating a position file.
///
/// The calculation engine itself never fails on bad numbers; anything that
/// would poison a computation is rejected here, at the input boundary.
#[derive(Debug, Error)]
pub enum PositionFileError {
    #[error("Could not read position file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Position file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Position '{ticker}' has a negative share count: {shares}")]
    NegativeShares { ticker: String, shares: f64 },

    #[error("Position '{ticker}' has a negative average cost: {avg_cost}")]
    NegativeCost { ticker: String, avg_cost: f64 },

    #[error("Position '{ticker}' has a negative holding duration: {years}")]
    NegativeYears { ticker: String, years: f64 },

    #[error("Position '{ticker}' has a negative current price: {price}")]
    NegativePrice { ticker: String, price: f64 },

    #[error("Position with empty ticker symbol")]
    EmptyTicker,
}
