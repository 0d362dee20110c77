use colored::Colorize;
use piechart::{Chart, Color};
use std::collections::HashMap;

use crate::chart::ChartPoint;
use crate::position::{HoldingStatus, Position};

pub struct Portfolio {
    pub positions: Vec<Position>,
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::new()
    }
}

impl Portfolio {
    pub fn new() -> Portfolio {
        Portfolio {
            positions: Vec::new(),
        }
    }

    pub fn add_position(&mut self, position: Position) {
        self.positions.push(position);
    }

    pub fn get_total_value(&self) -> f64 {
        let mut sum = 0.0;

        for position in &self.positions {
            sum += position.market_value();
        }
        sum
    }

    pub fn get_total_invested(&self) -> f64 {
        self.positions.iter().map(|p| p.invested()).sum()
    }

    /// Recompute each position's share of total market value. The stats
    /// pass leaves `weight_percent` untouched; this is the owner's job.
    pub fn refresh_weights(&mut self) {
        let total = self.get_total_value();
        for position in &mut self.positions {
            position.weight_percent = if total > 0.0 {
                position.market_value() / total * 100.0
            } else {
                0.0
            };
        }
    }

    pub fn get_sector_allocation(&self) -> HashMap<String, f64> {
        let mut allocation: HashMap<String, f64> = HashMap::new();
        let total_value = self.get_total_value();

        for position in &self.positions {
            if total_value <= 0.0 {
                break;
            }
            let sector = if position.sector.is_empty() {
                "Other"
            } else {
                position.sector.as_str()
            };
            let percentage = position.market_value() / total_value * 100.0;

            if let Some(value) = allocation.get_mut(sector) {
                *value += percentage;
            } else {
                allocation.insert(sector.to_string(), percentage);
            }
        }
        allocation
    }

    // Print the portfolio as a table
    pub fn print(&self, include_sum: bool) {
        use comfy_table::{
            presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color as TColor,
            ContentArrangement, Table,
        };

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_width(140);

        table.set_header(vec![
            Cell::new("Ticker").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Sector").add_attribute(Attribute::Bold),
            Cell::new("Shares").add_attribute(Attribute::Bold),
            Cell::new("Avg Cost").add_attribute(Attribute::Bold),
            Cell::new("Price").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
            Cell::new("Weight").add_attribute(Attribute::Bold),
            Cell::new("Years").add_attribute(Attribute::Bold),
            Cell::new("Nominal").add_attribute(Attribute::Bold),
            Cell::new("Real").add_attribute(Attribute::Bold),
            Cell::new("CAGR").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

        let pct_cell = |v: f64| {
            let c = if v >= 0.0 { TColor::Green } else { TColor::Red };
            Cell::new(format!("{v:.1}%"))
                .set_alignment(CellAlignment::Right)
                .fg(c)
        };

        for position in &self.positions {
            let status_color = match position.status {
                HoldingStatus::BeatingInflation => TColor::Green,
                HoldingStatus::TrackingMarket => TColor::Yellow,
                HoldingStatus::LosingPower => TColor::Red,
            };

            table.add_row(vec![
                Cell::new(&position.ticker),
                Cell::new(&position.name),
                Cell::new(&position.sector),
                Cell::new(format!("{:.4}", position.shares)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", position.avg_cost)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", position.current_price))
                    .set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", position.market_value()))
                    .set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.1}%", position.weight_percent))
                    .set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", position.years_held))
                    .set_alignment(CellAlignment::Right),
                pct_cell(position.nominal_return),
                pct_cell(position.real_return),
                pct_cell(position.cagr),
                Cell::new(position.status.as_str()).fg(status_color),
            ]);
        }

        if include_sum {
            let total_value = self.get_total_value();
            let total_invested = self.get_total_invested();
            let total_return = if total_invested > 0.0 {
                (total_value - total_invested) / total_invested * 100.0
            } else {
                0.0
            };
            table.add_row(vec![
                Cell::new("TOTAL").add_attribute(Attribute::Bold),
                Cell::new(""),
                Cell::new(""),
                Cell::new(""),
                Cell::new(format!("{total_invested:.2}"))
                    .set_alignment(CellAlignment::Right)
                    .add_attribute(Attribute::Bold),
                Cell::new(""),
                Cell::new(format!("{total_value:.2}"))
                    .set_alignment(CellAlignment::Right)
                    .add_attribute(Attribute::Bold),
                Cell::new(""),
                Cell::new(""),
                {
                    let c = if total_return >= 0.0 {
                        TColor::Green
                    } else {
                        TColor::Red
                    };
                    Cell::new(format!("{total_return:.1}%"))
                        .set_alignment(CellAlignment::Right)
                        .add_attribute(Attribute::Bold)
                        .fg(c)
                },
                Cell::new(""),
                Cell::new(""),
                Cell::new(""),
            ]);
        }

        println!("{table}");
    }

    /// Print the reconstructed growth series as a year-by-year table.
    pub fn print_history(points: &[ChartPoint], benchmark_label: &str) {
        use comfy_table::{
            presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color as TColor,
            ContentArrangement, Table,
        };

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_width(72);

        table.set_header(vec![
            Cell::new("Year").add_attribute(Attribute::Bold),
            Cell::new("Portfolio").add_attribute(Attribute::Bold),
            Cell::new(benchmark_label).add_attribute(Attribute::Bold),
            Cell::new("Inflation").add_attribute(Attribute::Bold),
        ]);

        let pct_cell = |v: f64| {
            let c = if v >= 0.0 { TColor::Green } else { TColor::Red };
            Cell::new(format!("{v:+.1}%"))
                .set_alignment(CellAlignment::Right)
                .fg(c)
        };

        for point in points {
            table.add_row(vec![
                Cell::new(point.year.to_string()),
                pct_cell(point.portfolio_growth),
                pct_cell(point.benchmark_growth),
                pct_cell(point.inflation_growth),
            ]);
        }

        println!("{table}");
        println!(
            "{}",
            "Position histories are rebuilt from entry and current price only, \
             shaped by the benchmark's actual annual returns. The portfolio line \
             is illustrative, not a historical record."
                .dimmed()
        );
    }

    // Print the sector allocation in descending order %-wise
    pub fn print_allocation(&self) {
        let allocation = self.get_sector_allocation();

        // create a vector and sort it by the %-value of the allocation in descending order
        let mut allocation_vec: Vec<(&String, &f64)> = allocation.iter().collect();
        allocation_vec.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap());

        println!("====================================");
        for (sector, percentage) in allocation_vec {
            println!("{sector: >20} | {percentage: >10.2}");
        }
    }

    pub fn draw_pie_chart(&self) {
        let mut data = vec![];

        let colors = [
            Color::Red,
            Color::Green,
            Color::Blue,
            Color::Yellow,
            Color::Cyan,
            Color::White,
            Color::Purple,
            Color::Black,
        ];

        let allocation = self.get_sector_allocation();
        let mut allocation_vec: Vec<(&String, &f64)> = allocation.iter().collect();
        allocation_vec.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap());

        for (i, (sector, percentage)) in allocation_vec.iter().enumerate() {
            data.push(piechart::Data {
                label: sector.to_string(),
                value: **percentage as f32,
                color: Some(colors[i % colors.len()].into()),
                fill: '•',
            });
        }

        if data.is_empty() {
            return;
        }

        Chart::new()
            .legend(true)
            .radius(9)
            .aspect_ratio(3)
            .draw(&data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inflation::US_CPI;
    use crate::merge;
    use crate::position::from_string;

    fn sample() -> Vec<Position> {
        let data = r#"[
            {"Ticker": "AAPL", "Name": "Apple Inc.", "Sector": "Technology",
             "Shares": 10, "AvgCost": 100.0, "CurrentPrice": 200.0, "YearsHeld": 3.0},
            {"Ticker": "JNJ", "Name": "Johnson & Johnson", "Sector": "Healthcare",
             "Shares": 20, "AvgCost": 150.0, "CurrentPrice": 150.0, "YearsHeld": 2.0}
        ]"#;
        from_string(data).unwrap()
    }

    #[test]
    fn test_total_value_sums_market_values() {
        let mut portfolio = Portfolio::new();
        for p in sample() {
            portfolio.add_position(p);
        }
        assert_eq!(portfolio.get_total_value(), 10.0 * 200.0 + 20.0 * 150.0);
        assert_eq!(portfolio.get_total_invested(), 10.0 * 100.0 + 20.0 * 150.0);
    }

    #[test]
    fn test_refresh_weights_sums_to_hundred() {
        let mut portfolio = Portfolio::new();
        for p in sample() {
            portfolio.add_position(p);
        }
        portfolio.refresh_weights();
        let total: f64 = portfolio.positions.iter().map(|p| p.weight_percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!((portfolio.positions[0].weight_percent - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_refresh_weights_on_zero_value_portfolio() {
        let mut portfolio = Portfolio::new();
        let mut p = sample().remove(0);
        p.shares = 0.0;
        portfolio.add_position(p);
        portfolio.refresh_weights();
        assert_eq!(portfolio.positions[0].weight_percent, 0.0);
    }

    #[test]
    fn test_sector_allocation_groups_by_sector() {
        let mut positions = sample();
        positions.push({
            let mut p = positions[0].clone();
            p.ticker = "MSFT".to_string();
            p.name = "Microsoft".to_string();
            p
        });
        let mut portfolio = Portfolio::new();
        for p in merge::merge_all(Vec::new(), positions, &US_CPI) {
            portfolio.add_position(p);
        }
        let allocation = portfolio.get_sector_allocation();
        assert_eq!(allocation.len(), 2);
        let tech = allocation.get("Technology").unwrap();
        let health = allocation.get("Healthcare").unwrap();
        assert!((tech + health - 100.0).abs() < 1e-9);
        assert!(tech > health);
    }
}
