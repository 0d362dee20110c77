use crate::benchmark::Benchmark;
use crate::portfolio::Portfolio;
use crate::position::Position;

use clap::{arg, Command};
use colored::Colorize;
use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use serde::Serialize;

mod benchmark;
mod chart;
mod error;
mod inflation;
mod merge;
mod portfolio;
mod position;

#[derive(Serialize, Deserialize)]
struct Config {
    portfolio_file: String,
    benchmark: Benchmark,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portfolio_file: "example_data.json".to_string(),
            benchmark: Benchmark::Sp500,
        }
    }
}

fn cli() -> Command {
    Command::new("realfolio")
        .about("Analyze portfolio performance against inflation and market benchmarks")
        .arg_required_else_help(true)
        .subcommand(Command::new("config").about("Print the path to the config file"))
        .subcommand(
            Command::new("stats")
                .about("Show per-position returns, CAGR and purchasing-power status")
                .arg(
                    arg!(<FILE> "JSON file with your positions")
                        .required(false)
                        .default_value(""),
                ),
        )
        .subcommand(
            Command::new("chart")
                .about("Show the reconstructed growth history vs a benchmark and inflation")
                .arg(
                    arg!(<FILE> "JSON file with your positions")
                        .required(false)
                        .default_value(""),
                )
                .arg(
                    arg!(-b --benchmark <BENCHMARK> "Benchmark index: sp500, nasdaq or dow")
                        .required(false),
                ),
        )
        .subcommand(
            Command::new("allocation")
                .about("Show the sector allocation of your portfolio")
                .arg(
                    arg!(<FILE> "JSON file with your positions")
                        .required(false)
                        .default_value(""),
                ),
        )
        .subcommand(
            Command::new("inflation")
                .about("Show cumulative and average inflation over a holding period")
                .arg(arg!(<YEARS> "Holding duration in years, fractional allowed")),
        )
}

// Load positions from a JSON file, compute their stats and collapse
// duplicate tickers into weighted positions.
fn load_portfolio(filename: &str) -> Result<Portfolio> {
    let mut positions: Vec<Position> = position::from_file(filename)?;
    for position in &mut positions {
        position.recalculate_stats(&inflation::US_CPI);
    }
    let merged = merge::merge_all(Vec::new(), positions, &inflation::US_CPI);

    let mut portfolio = Portfolio::new();
    for position in merged {
        portfolio.add_position(position);
    }
    portfolio.refresh_weights();
    Ok(portfolio)
}

fn print_inflation_summary(years: f64) {
    let cumulative = inflation::cumulative_inflation(years, &inflation::US_CPI) * 100.0;
    let average = inflation::average_inflation_rate(years.ceil() as u32, &inflation::US_CPI);

    println!(
        "Cumulative inflation over {} years: {}",
        years,
        format!("{cumulative:.2}%").bold()
    );
    println!(
        "Average annual rate over the trailing {} years: {}",
        years.ceil() as u32,
        format!("{average:.2}%").bold()
    );
    println!(
        "{}",
        "A holding must out-gain the cumulative figure to preserve purchasing power.".dimmed()
    );
}

fn main() -> Result<()> {
    env_logger::init();

    let cfg: Config =
        confy::load("realfolio", "config").wrap_err("could not load configuration")?;

    let matches = cli().get_matches();

    if matches.subcommand_matches("config").is_some() {
        println!(
            "Your config file is located here: \n{}",
            confy::get_configuration_file_path("realfolio", "config")?
                .to_str()
                .ok_or_else(|| eyre!("config path is not valid UTF-8"))?
        );
    }

    if let Some(matches) = matches.subcommand_matches("inflation") {
        let years: f64 = matches
            .get_one::<String>("YEARS")
            .expect("YEARS is required")
            .parse()
            .wrap_err("YEARS must be a number")?;
        if years < 0.0 {
            return Err(eyre!("YEARS must not be negative"));
        }
        print_inflation_summary(years);
    }

    for subcommand in ["stats", "chart", "allocation"].iter() {
        if let Some(matches) = matches.subcommand_matches(subcommand) {
            let mut filename = String::new();

            // try to get filename as argument
            if let Ok(Some(f)) = matches.try_get_one::<String>("FILE") {
                filename = f.to_string();
            }
            // if no argument is given, try to get filename from config
            if filename.is_empty() {
                filename.clone_from(&cfg.portfolio_file);
            }
            // if no argument and no config is given, print help
            if filename.is_empty() {
                cli().print_help()?;
                return Ok(());
            }

            let portfolio = load_portfolio(&filename)?;

            match subcommand as &str {
                "stats" => {
                    portfolio.print(true);
                }
                "chart" => {
                    let benchmark = match matches.get_one::<String>("benchmark") {
                        Some(name) => name.parse::<Benchmark>().map_err(|e| {
                            let options = Benchmark::all()
                                .iter()
                                .map(|b| b.to_string())
                                .collect::<Vec<_>>()
                                .join(", ");
                            eyre!("{e} (expected one of: {options})")
                        })?,
                        None => cfg.benchmark,
                    };
                    let points =
                        chart::reconstruct(&portfolio.positions, benchmark, &inflation::US_CPI);
                    Portfolio::print_history(&points, benchmark.as_str());
                }
                "allocation" => {
                    portfolio.draw_pie_chart();
                    portfolio.print_allocation();
                }
                _ => (),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli() {
        let matches = cli().get_matches_from(vec!["realfolio", "stats", "example_data.json"]);
        assert_eq!(matches.subcommand_name(), Some("stats"));
    }

    #[test]
    fn test_cli_chart_benchmark_flag() {
        let matches = cli().get_matches_from(vec![
            "realfolio",
            "chart",
            "example_data.json",
            "--benchmark",
            "nasdaq",
        ]);
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "chart");
        assert_eq!(sub.get_one::<String>("benchmark").unwrap(), "nasdaq");
    }

    #[test]
    fn test_load_portfolio_merges_duplicate_tickers() {
        let portfolio = load_portfolio("example_data.json").unwrap();

        // The example file carries two AAPL lots in different casing; the
        // loaded portfolio holds one weighted position per ticker.
        let aapl: Vec<_> = portfolio
            .positions
            .iter()
            .filter(|p| p.ticker.eq_ignore_ascii_case("AAPL"))
            .collect();
        assert_eq!(aapl.len(), 1);
        assert!(aapl[0].shares > 25.0);

        let weight_total: f64 = portfolio.positions.iter().map(|p| p.weight_percent).sum();
        assert!((weight_total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_portfolio_computes_stats() {
        let portfolio = load_portfolio("example_data.json").unwrap();
        for position in &portfolio.positions {
            if position.avg_cost > 0.0 && position.current_price > 0.0 {
                assert!(position.nominal_return != 0.0 || position.cagr != 0.0);
            }
        }
    }
}
