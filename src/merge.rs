//! Combining duplicate lots of the same instrument into one weighted
//! position.

use log::debug;

use crate::inflation::RateTable;
use crate::position::Position;

/// Round a holding duration to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Prefer the incoming display field when it is present.
fn pick_field(incoming: &str, existing: &str) -> String {
    if incoming.is_empty() {
        existing.to_string()
    } else {
        incoming.to_string()
    }
}

/// Fold `incoming` into `portfolio`. Two positions are the same
/// instrument iff their tickers match case-insensitively; when they do,
/// the lots combine into one weighted position written back at the
/// existing entry's index, keeping the existing entry's ticker casing.
/// With no match the incoming position is appended unchanged.
///
/// The combined average cost is share-weighted. The combined holding
/// duration is weighted by invested capital, not by share count, so a
/// small recent lot cannot skew the apparent age of a large long-held
/// one.
pub fn merge_into(mut portfolio: Vec<Position>, incoming: Position, rates: &RateTable) -> Vec<Position> {
    let matched = portfolio
        .iter()
        .position(|p| p.ticker.eq_ignore_ascii_case(&incoming.ticker));

    let Some(index) = matched else {
        portfolio.push(incoming);
        return portfolio;
    };

    let existing = &portfolio[index];
    debug!(
        "merging lot of {} ({} shares) into existing {} ({} shares)",
        incoming.ticker, incoming.shares, existing.ticker, existing.shares
    );

    let total_shares = existing.shares + incoming.shares;

    let mut merged = if total_shares == 0.0 {
        // Nothing held on either side: carry the incoming display data
        // forward but zero out the economics.
        Position {
            ticker: existing.ticker.clone(),
            name: incoming.name.clone(),
            sector: incoming.sector.clone(),
            shares: 0.0,
            avg_cost: 0.0,
            current_price: incoming.current_price,
            years_held: existing.years_held.max(incoming.years_held),
            last_updated: incoming.last_updated.clone(),
            nominal_return: 0.0,
            real_return: 0.0,
            cagr: 0.0,
            weight_percent: 0.0,
            status: Default::default(),
        }
    } else {
        let existing_cost = existing.invested();
        let incoming_cost = incoming.invested();

        let years_held = if existing_cost + incoming_cost > 0.0 {
            round2(
                (existing_cost * existing.years_held + incoming_cost * incoming.years_held)
                    / (existing_cost + incoming_cost),
            )
        } else {
            existing.years_held.max(incoming.years_held)
        };

        Position {
            ticker: existing.ticker.clone(),
            name: pick_field(&incoming.name, &existing.name),
            sector: pick_field(&incoming.sector, &existing.sector),
            shares: total_shares,
            avg_cost: (existing_cost + incoming_cost) / total_shares,
            current_price: if incoming.current_price > 0.0 {
                incoming.current_price
            } else {
                existing.current_price
            },
            years_held,
            last_updated: incoming
                .last_updated
                .clone()
                .or_else(|| existing.last_updated.clone()),
            nominal_return: 0.0,
            real_return: 0.0,
            cagr: 0.0,
            weight_percent: 0.0,
            status: Default::default(),
        }
    };

    merged.recalculate_stats(rates);
    portfolio[index] = merged;
    portfolio
}

/// Fold every incoming position into `current`, in order. Later incoming
/// lots may match positions created by earlier merges, so the order of
/// `incoming` is significant.
pub fn merge_all(current: Vec<Position>, incoming: Vec<Position>, rates: &RateTable) -> Vec<Position> {
    incoming
        .into_iter()
        .fold(current, |acc, position| merge_into(acc, position, rates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inflation::US_CPI;
    use crate::position::HoldingStatus;

    fn lot(ticker: &str, shares: f64, avg_cost: f64, years_held: f64) -> Position {
        Position {
            ticker: ticker.to_string(),
            name: format!("{ticker} Inc."),
            sector: "Technology".to_string(),
            shares,
            avg_cost,
            current_price: 100.0,
            years_held,
            last_updated: None,
            nominal_return: 0.0,
            real_return: 0.0,
            cagr: 0.0,
            weight_percent: 0.0,
            status: HoldingStatus::default(),
        }
    }

    #[test]
    fn test_weighted_average_cost() {
        let portfolio = vec![lot("AAPL", 100.0, 50.0, 2.0)];
        let merged = merge_into(portfolio, lot("AAPL", 50.0, 80.0, 2.0), &US_CPI);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].shares, 150.0);
        assert_eq!(merged[0].avg_cost, 60.0);
    }

    #[test]
    fn test_years_weighted_by_invested_capital() {
        // Two $5,000 lots held 4 and 2 years land on exactly 3 years.
        let portfolio = vec![lot("VTI", 50.0, 100.0, 4.0)];
        let merged = merge_into(portfolio, lot("VTI", 25.0, 200.0, 2.0), &US_CPI);
        assert_eq!(merged[0].years_held, 3.0);
    }

    #[test]
    fn test_capital_weighting_differs_from_share_weighting() {
        // 10 shares x $10 held 10 years vs 90 shares x $90 held 1 year:
        // share-weighting would give 1.9 years, capital-weighting 1.11.
        let portfolio = vec![lot("KO", 10.0, 10.0, 10.0)];
        let merged = merge_into(portfolio, lot("KO", 90.0, 90.0, 1.0), &US_CPI);
        let expected: f64 = (100.0 * 10.0 + 8100.0 * 1.0) / 8200.0;
        assert_eq!(merged[0].years_held, (expected * 100.0).round() / 100.0);
    }

    #[test]
    fn test_ticker_match_is_case_insensitive() {
        let portfolio = vec![lot("AAPL", 10.0, 100.0, 1.0)];
        let merged = merge_into(portfolio, lot("aapl", 5.0, 100.0, 1.0), &US_CPI);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].ticker, "AAPL");
        assert_eq!(merged[0].shares, 15.0);
    }

    #[test]
    fn test_existing_ticker_casing_wins() {
        let portfolio = vec![lot("brk.b", 1.0, 300.0, 1.0)];
        let merged = merge_into(portfolio, lot("BRK.B", 1.0, 300.0, 1.0), &US_CPI);
        assert_eq!(merged[0].ticker, "brk.b");
    }

    #[test]
    fn test_unmatched_position_is_appended_in_order() {
        let portfolio = vec![lot("AAPL", 10.0, 100.0, 1.0)];
        let merged = merge_into(portfolio, lot("MSFT", 5.0, 200.0, 2.0), &US_CPI);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].ticker, "AAPL");
        assert_eq!(merged[1].ticker, "MSFT");
    }

    #[test]
    fn test_zero_total_shares_zeroes_the_economics() {
        let mut incoming = lot("GME", 0.0, 0.0, 1.0);
        incoming.name = "GameStop".to_string();
        let portfolio = vec![lot("GME", 0.0, 50.0, 4.0)];
        let merged = merge_into(portfolio, incoming, &US_CPI);
        assert_eq!(merged[0].shares, 0.0);
        assert_eq!(merged[0].avg_cost, 0.0);
        assert_eq!(merged[0].years_held, 4.0);
        assert_eq!(merged[0].name, "GameStop");
        assert_eq!(merged[0].status, HoldingStatus::TrackingMarket);
    }

    #[test]
    fn test_incoming_display_fields_win_when_present() {
        let mut existing = lot("NVDA", 10.0, 40.0, 3.0);
        existing.last_updated = Some("2024-01-01".to_string());
        let mut incoming = lot("NVDA", 5.0, 120.0, 1.0);
        incoming.name = "NVIDIA Corporation".to_string();
        incoming.current_price = 130.0;
        incoming.last_updated = Some("2025-06-01".to_string());

        let merged = merge_into(vec![existing], incoming, &US_CPI);
        assert_eq!(merged[0].name, "NVIDIA Corporation");
        assert_eq!(merged[0].current_price, 130.0);
        assert_eq!(merged[0].last_updated.as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn test_blank_incoming_display_fields_are_retained_from_existing() {
        let mut incoming = lot("NVDA", 5.0, 120.0, 1.0);
        incoming.name = String::new();
        incoming.sector = String::new();
        incoming.current_price = 0.0;

        let merged = merge_into(vec![lot("NVDA", 10.0, 40.0, 3.0)], incoming, &US_CPI);
        assert_eq!(merged[0].name, "NVDA Inc.");
        assert_eq!(merged[0].sector, "Technology");
        assert_eq!(merged[0].current_price, 100.0);
    }

    #[test]
    fn test_merge_recomputes_stats() {
        let portfolio = vec![lot("AAPL", 100.0, 50.0, 2.0)];
        let merged = merge_into(portfolio, lot("AAPL", 50.0, 80.0, 2.0), &US_CPI);
        // avg cost 60, price 100 -> nominal (100-60)/60 = 66.7%.
        assert_eq!(merged[0].nominal_return, 66.7);
        assert_eq!(merged[0].status, HoldingStatus::BeatingInflation);
    }

    #[test]
    fn test_merge_all_folds_in_order() {
        let incoming = vec![
            lot("AAPL", 10.0, 100.0, 2.0),
            lot("MSFT", 5.0, 200.0, 1.0),
            lot("aapl", 10.0, 120.0, 1.0),
        ];
        let merged = merge_all(Vec::new(), incoming, &US_CPI);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].ticker, "AAPL");
        assert_eq!(merged[0].shares, 20.0);
        assert_eq!(merged[0].avg_cost, 110.0);
        assert_eq!(merged[1].ticker, "MSFT");
    }
}
