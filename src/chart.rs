//! Reconstruction of an illustrative portfolio growth history.
//!
//! Only two real data points exist per position (entry price and current
//! price), so a full price history has to be synthesized. Each position's
//! path follows the benchmark's actual year-to-year shape, shifted by the
//! constant annualized excess return ("alpha") that makes the path
//! compound to the position's known total return. The benchmark and
//! inflation channels are ground truth from the historical tables; only
//! the portfolio channel is synthetic.

use chrono::Datelike;
use log::debug;

use crate::benchmark::{Benchmark, DEFAULT_ANNUAL_RETURN};
use crate::inflation::RateTable;
use crate::position::Position;

/// Inflation rate assumed for chart years missing from the table, in
/// percent.
const MISSING_YEAR_INFLATION: f64 = 2.5;

/// Annualized benchmark return assumed when a holding is too young for
/// any table data, as a fraction.
const FALLBACK_TRAILING_CAGR: f64 = 0.08;

/// One year of the reconstructed series. Each channel is cumulative
/// percent growth relative to the first point, which is 0 for all three
/// by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub year: i32,
    pub portfolio_growth: f64,
    pub benchmark_growth: f64,
    pub inflation_growth: f64,
}

/// Reconstruct the growth series for the current calendar year.
pub fn reconstruct(
    positions: &[Position],
    benchmark: Benchmark,
    inflation: &RateTable,
) -> Vec<ChartPoint> {
    reconstruct_at(positions, benchmark, inflation, chrono::Utc::now().year())
}

/// Reconstruct the growth series as of `current_year`. Deterministic
/// given the rate tables.
pub fn reconstruct_at(
    positions: &[Position],
    benchmark: Benchmark,
    inflation: &RateTable,
    current_year: i32,
) -> Vec<ChartPoint> {
    reconstruct_with_tables(
        positions,
        benchmark.annual_returns(),
        benchmark.inception_year(),
        inflation,
        current_year,
    )
}

/// The table-injected core of the reconstruction, shared by the real
/// benchmarks and the tests.
pub fn reconstruct_with_tables(
    positions: &[Position],
    returns: &RateTable,
    inception_year: i32,
    inflation: &RateTable,
    current_year: i32,
) -> Vec<ChartPoint> {
    // One baseline year before the earliest holding period, so the first
    // real year's move is visible. Never before the index existed, and
    // never fewer than two points.
    let max_years = positions
        .iter()
        .map(|p| p.years_held)
        .fold(0.0_f64, f64::max);
    let span = (max_years.ceil() as i32).max(2) + 1;
    let start_year = (current_year - span)
        .max(inception_year)
        .min(current_year - 1);
    let years: Vec<i32> = (start_year..=current_year).collect();

    let mut values = vec![0.0_f64; years.len()];
    for position in positions {
        if position.avg_cost <= 0.0 || position.current_price <= 0.0 {
            continue;
        }
        let Some(path) = simulate_price_path(position, &years, returns, current_year) else {
            debug!("{}: no finite price path, excluded from chart", position.ticker);
            continue;
        };
        for (value, price) in values.iter_mut().zip(&path) {
            *value += price * position.shares;
        }
    }

    let baseline = values[0];
    let mut benchmark_index = 100.0;
    let mut inflation_index = 100.0;
    let mut points = Vec::with_capacity(years.len());

    for (i, &year) in years.iter().enumerate() {
        if i > 0 {
            let bench_rate = returns.rate(year).unwrap_or(DEFAULT_ANNUAL_RETURN);
            benchmark_index *= 1.0 + bench_rate / 100.0;
            let infl_rate = inflation.rate(year).unwrap_or(MISSING_YEAR_INFLATION);
            inflation_index *= 1.0 + infl_rate / 100.0;
        }
        let portfolio_growth = if i == 0 || baseline <= 0.0 {
            0.0
        } else {
            values[i] / baseline * 100.0 - 100.0
        };
        points.push(ChartPoint {
            year,
            portfolio_growth,
            benchmark_growth: if i == 0 { 0.0 } else { benchmark_index - 100.0 },
            inflation_growth: if i == 0 { 0.0 } else { inflation_index - 100.0 },
        });
    }

    points
}

/// Walk a position's price backward from the known current price, one
/// year per step, dividing by the benchmark's return for that year plus
/// the position's alpha. The resulting path ends exactly at the current
/// price and, compounded over the stated holding period, reproduces the
/// position's actual total return.
///
/// Returns `None` when the arithmetic degenerates (a zero-year holding
/// with a price gain implies an infinite annualized return); such
/// positions are excluded from the aggregate rather than poisoning it.
fn simulate_price_path(
    position: &Position,
    years: &[i32],
    returns: &RateTable,
    current_year: i32,
) -> Option<Vec<f64>> {
    let own_cagr =
        (position.current_price / position.avg_cost).powf(1.0 / position.years_held) - 1.0;
    let window = (position.years_held.floor() as i32).max(1);
    let benchmark_cagr = trailing_benchmark_cagr(returns, window, current_year);
    let alpha = own_cagr - benchmark_cagr;
    if !alpha.is_finite() {
        return None;
    }
    debug!(
        "{}: cagr {:.4}, benchmark {:.4} over {} yr window, alpha {:.4}",
        position.ticker, own_cagr, benchmark_cagr, window, alpha
    );

    let mut path = vec![0.0_f64; years.len()];
    let last = years.len() - 1;
    path[last] = position.current_price;
    for i in (0..last).rev() {
        let year_return = returns.rate(years[i + 1]).unwrap_or(DEFAULT_ANNUAL_RETURN);
        path[i] = path[i + 1] / (1.0 + year_return / 100.0 + alpha);
    }

    if path.iter().any(|price| !price.is_finite()) {
        return None;
    }
    Some(path)
}

/// The benchmark's realized CAGR over the trailing `window` completed
/// years, as a fraction. Years absent from the table are skipped; a
/// window with no data at all falls back to a fixed default.
fn trailing_benchmark_cagr(returns: &RateTable, window: i32, current_year: i32) -> f64 {
    let mut compounded = 1.0;
    let mut found = 0;
    for year in (current_year - window)..current_year {
        if let Some(rate) = returns.rate(year) {
            compounded *= 1.0 + rate / 100.0;
            found += 1;
        }
    }
    if found == 0 {
        return FALLBACK_TRAILING_CAGR;
    }
    compounded.powf(1.0 / f64::from(found)) - 1.0
}
