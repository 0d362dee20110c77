use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::Read;

use crate::error::PositionFileError;
use crate::inflation::{self, RateTable};

/// Qualitative purchasing-power classification of a holding, based on its
/// inflation-adjusted return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HoldingStatus {
    BeatingInflation,
    #[default]
    TrackingMarket,
    LosingPower,
}

impl HoldingStatus {
    /// Classify a real (inflation-adjusted) return percentage. Both band
    /// boundaries are inclusive toward the better status.
    pub fn classify(real_return: f64) -> HoldingStatus {
        if real_return >= 1.0 {
            HoldingStatus::BeatingInflation
        } else if real_return >= -1.0 {
            HoldingStatus::TrackingMarket
        } else {
            HoldingStatus::LosingPower
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HoldingStatus::BeatingInflation => "Beating Inflation",
            HoldingStatus::TrackingMarket => "Tracking Market",
            HoldingStatus::LosingPower => "Losing Power",
        }
    }
}

impl fmt::Display for HoldingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One held instrument: the user-entered lot data plus the derived
/// performance fields.
///
/// The derived fields (`nominal_return`, `real_return`, `cagr`, `status`)
/// are only valid immediately after [`Position::recalculate_stats`]; any
/// edit of `avg_cost`, `current_price` or `years_held` leaves them stale
/// until the next recomputation. `weight_percent` is maintained by the
/// owning portfolio, not by the statistics pass.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Position {
    pub ticker: String,
    pub name: String,
    #[serde(default)]
    pub sector: String,
    pub shares: f64,
    pub avg_cost: f64,
    pub current_price: f64,
    pub years_held: f64,
    #[serde(default)]
    pub last_updated: Option<String>,

    #[serde(skip)]
    pub nominal_return: f64,
    #[serde(skip)]
    pub real_return: f64,
    #[serde(skip)]
    pub cagr: f64,
    #[serde(skip)]
    pub weight_percent: f64,
    #[serde(skip)]
    pub status: HoldingStatus,
}

/// Round a percentage to one decimal place. Stats are stored rounded, so
/// downstream merge and classification logic sees the same figures the
/// user does.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl Position {
    /// Recompute the derived performance fields from cost, price and
    /// holding duration. Only the derived set is written; the lot data
    /// itself is read-only here.
    ///
    /// Non-positive cost or price short-circuits to all-zero stats and the
    /// neutral status rather than erroring.
    pub fn recalculate_stats(&mut self, rates: &RateTable) {
        if self.avg_cost <= 0.0 || self.current_price <= 0.0 {
            self.nominal_return = 0.0;
            self.real_return = 0.0;
            self.cagr = 0.0;
            self.status = HoldingStatus::TrackingMarket;
            return;
        }

        let nominal = round1((self.current_price - self.avg_cost) / self.avg_cost * 100.0);

        let drag = inflation::cumulative_inflation(self.years_held, rates);
        let real = round1(((1.0 + nominal / 100.0) / (1.0 + drag) - 1.0) * 100.0);

        // Holdings under a year are annualized as one full year so a good
        // first week does not show up as a triple-digit CAGR.
        let effective_years = if self.years_held > 0.0 {
            self.years_held.max(1.0)
        } else {
            1.0
        };
        let cagr = round1(
            ((self.current_price / self.avg_cost).powf(1.0 / effective_years) - 1.0) * 100.0,
        );

        self.nominal_return = nominal;
        self.real_return = real;
        self.cagr = cagr;
        self.status = HoldingStatus::classify(real);
    }

    pub fn market_value(&self) -> f64 {
        self.shares * self.current_price
    }

    pub fn invested(&self) -> f64 {
        self.shares * self.avg_cost
    }
}

fn validate(position: &Position) -> Result<(), PositionFileError> {
    if position.ticker.trim().is_empty() {
        return Err(PositionFileError::EmptyTicker);
    }
    if position.shares < 0.0 {
        return Err(PositionFileError::NegativeShares {
            ticker: position.ticker.clone(),
            shares: position.shares,
        });
    }
    if position.avg_cost < 0.0 {
        return Err(PositionFileError::NegativeCost {
            ticker: position.ticker.clone(),
            avg_cost: position.avg_cost,
        });
    }
    if position.current_price < 0.0 {
        return Err(PositionFileError::NegativePrice {
            ticker: position.ticker.clone(),
            price: position.current_price,
        });
    }
    if position.years_held < 0.0 {
        return Err(PositionFileError::NegativeYears {
            ticker: position.ticker.clone(),
            years: position.years_held,
        });
    }
    Ok(())
}

/// Parse a JSON position list, canonicalizing tickers to uppercase and
/// rejecting negative numeric fields.
pub fn from_string(data: &str) -> Result<Vec<Position>, PositionFileError> {
    let mut positions = serde_json::from_str::<Vec<Position>>(data)?;
    for position in &mut positions {
        validate(position)?;
        position.ticker = position.ticker.trim().to_uppercase();
    }
    Ok(positions)
}

pub fn from_file(filename: &str) -> Result<Vec<Position>, PositionFileError> {
    let read = |source| PositionFileError::Read {
        path: filename.to_string(),
        source,
    };
    let mut file = File::open(filename).map_err(read)?;
    let mut data = String::new();
    file.read_to_string(&mut data).map_err(read)?;
    from_string(&data)
}
