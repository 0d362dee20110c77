//! Cumulative inflation over a holding period.
//!
//! Walks a year-indexed table of annual inflation rates backward from the
//! most recent recorded year, compounding one full year at a time and
//! finishing with a geometric partial-year step for fractional holding
//! durations. Years past the table's span fall back to a fixed default
//! rate instead of failing.
//!
//! Every function takes the rate table as an explicit parameter;
//! [`US_CPI`] is the data the CLI passes in.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Annual rate assumed for years the table does not cover, in percent.
pub const DEFAULT_ANNUAL_RATE: f64 = 3.0;

/// Year-indexed annual rates in percent. Shared by the inflation and
/// benchmark tables; negative entries (deflation years, market losses)
/// are valid.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: BTreeMap<i32, f64>,
}

impl RateTable {
    pub fn new(rates: impl IntoIterator<Item = (i32, f64)>) -> Self {
        RateTable {
            rates: rates.into_iter().collect(),
        }
    }

    /// The most recent year with a recorded rate.
    pub fn latest_year(&self) -> Option<i32> {
        self.rates.keys().next_back().copied()
    }

    pub fn rate(&self, year: i32) -> Option<f64> {
        self.rates.get(&year).copied()
    }
}

/// Total compounded inflation over `years_held` years, as a
/// multiplier-minus-one (0.1025 means prices rose 10.25%).
///
/// Holding durations of zero or less carry no inflation drag and return
/// exactly 0.
pub fn cumulative_inflation(years_held: f64, rates: &RateTable) -> f64 {
    if years_held <= 0.0 {
        return 0.0;
    }

    let anchor = rates.latest_year().unwrap_or(0);
    let full_years = years_held.floor() as i32;
    let remainder = years_held - years_held.floor();

    let mut total = 1.0;
    for offset in 0..full_years {
        let rate = rates.rate(anchor - offset).unwrap_or(DEFAULT_ANNUAL_RATE);
        total *= 1.0 + rate / 100.0;
    }
    if remainder > 0.0 {
        // The stub year compounds geometrically, never linearly.
        let rate = rates.rate(anchor - full_years).unwrap_or(DEFAULT_ANNUAL_RATE);
        total *= (1.0 + rate / 100.0).powf(remainder);
    }

    total - 1.0
}

/// Simple arithmetic mean of the trailing `years` annual rates, in
/// percent. A rough estimate for callers with no specific holding
/// duration; not interchangeable with [`cumulative_inflation`], which
/// compounds.
pub fn average_inflation_rate(years: u32, rates: &RateTable) -> f64 {
    if years == 0 {
        return DEFAULT_ANNUAL_RATE;
    }
    let anchor = rates.latest_year().unwrap_or(0);
    let sum: f64 = (0..years as i32)
        .map(|offset| rates.rate(anchor - offset).unwrap_or(DEFAULT_ANNUAL_RATE))
        .sum();
    sum / f64::from(years)
}

/// US consumer price inflation by calendar year, annual percent (CPI-U).
pub static US_CPI: Lazy<RateTable> = Lazy::new(|| {
    RateTable::new([
        (1990, 5.4),
        (1991, 4.2),
        (1992, 3.0),
        (1993, 3.0),
        (1994, 2.6),
        (1995, 2.8),
        (1996, 3.0),
        (1997, 2.3),
        (1998, 1.6),
        (1999, 2.2),
        (2000, 3.4),
        (2001, 2.8),
        (2002, 1.6),
        (2003, 2.3),
        (2004, 2.7),
        (2005, 3.4),
        (2006, 3.2),
        (2007, 2.8),
        (2008, 3.8),
        (2009, -0.4),
        (2010, 1.6),
        (2011, 3.2),
        (2012, 2.1),
        (2013, 1.5),
        (2014, 1.6),
        (2015, 0.1),
        (2016, 1.3),
        (2017, 2.1),
        (2018, 2.4),
        (2019, 1.8),
        (2020, 1.2),
        (2021, 4.7),
        (2022, 8.0),
        (2023, 4.1),
        (2024, 2.9),
    ])
});
