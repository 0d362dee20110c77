use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::inflation::RateTable;

/// Annual return assumed for years missing from a benchmark table, in
/// percent.
pub const DEFAULT_ANNUAL_RETURN: f64 = 7.0;

/// The market index a portfolio is charted against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Benchmark {
    #[default]
    #[serde(rename = "sp500")]
    Sp500,
    #[serde(rename = "nasdaq")]
    Nasdaq,
    #[serde(rename = "dow")]
    DowJones,
}

impl Benchmark {
    pub fn all() -> [Benchmark; 3] {
        [Benchmark::Sp500, Benchmark::Nasdaq, Benchmark::DowJones]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Benchmark::Sp500 => "S&P 500",
            Benchmark::Nasdaq => "NASDAQ Composite",
            Benchmark::DowJones => "Dow Jones",
        }
    }

    /// Earliest year a chart window may start at for this index.
    pub fn inception_year(&self) -> i32 {
        match self {
            Benchmark::Sp500 => 1957,
            Benchmark::Nasdaq => 1971,
            Benchmark::DowJones => 1896,
        }
    }

    /// Realized annual returns by calendar year, in percent.
    pub fn annual_returns(&self) -> &'static RateTable {
        match self {
            Benchmark::Sp500 => &SP500_RETURNS,
            Benchmark::Nasdaq => &NASDAQ_RETURNS,
            Benchmark::DowJones => &DOW_RETURNS,
        }
    }
}

impl FromStr for Benchmark {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sp500" | "s&p500" | "s&p 500" | "spx" => Ok(Benchmark::Sp500),
            "nasdaq" | "ixic" => Ok(Benchmark::Nasdaq),
            "dow" | "dowjones" | "djia" => Ok(Benchmark::DowJones),
            _ => Err(format!("Unknown benchmark: '{s}'")),
        }
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static SP500_RETURNS: Lazy<RateTable> = Lazy::new(|| {
    RateTable::new([
        (1990, -3.1),
        (1991, 30.5),
        (1992, 7.6),
        (1993, 10.1),
        (1994, 1.3),
        (1995, 37.6),
        (1996, 23.0),
        (1997, 33.4),
        (1998, 28.6),
        (1999, 21.0),
        (2000, -9.1),
        (2001, -11.9),
        (2002, -22.1),
        (2003, 28.7),
        (2004, 10.9),
        (2005, 4.9),
        (2006, 15.8),
        (2007, 5.5),
        (2008, -37.0),
        (2009, 26.5),
        (2010, 15.1),
        (2011, 2.1),
        (2012, 16.0),
        (2013, 32.4),
        (2014, 13.7),
        (2015, 1.4),
        (2016, 12.0),
        (2017, 21.8),
        (2018, -4.4),
        (2019, 31.5),
        (2020, 18.4),
        (2021, 28.7),
        (2022, -18.1),
        (2023, 26.3),
        (2024, 25.0),
    ])
});

static NASDAQ_RETURNS: Lazy<RateTable> = Lazy::new(|| {
    RateTable::new([
        (1995, 39.9),
        (1996, 22.7),
        (1997, 21.6),
        (1998, 39.6),
        (1999, 85.6),
        (2000, -39.3),
        (2001, -21.1),
        (2002, -31.5),
        (2003, 50.0),
        (2004, 8.6),
        (2005, 1.4),
        (2006, 9.5),
        (2007, 9.8),
        (2008, -40.5),
        (2009, 43.9),
        (2010, 16.9),
        (2011, -1.8),
        (2012, 15.9),
        (2013, 38.3),
        (2014, 13.4),
        (2015, 5.7),
        (2016, 7.5),
        (2017, 28.2),
        (2018, -3.9),
        (2019, 35.2),
        (2020, 43.6),
        (2021, 21.4),
        (2022, -33.1),
        (2023, 43.4),
        (2024, 28.6),
    ])
});

static DOW_RETURNS: Lazy<RateTable> = Lazy::new(|| {
    RateTable::new([
        (1995, 33.5),
        (1996, 26.0),
        (1997, 22.6),
        (1998, 16.1),
        (1999, 25.2),
        (2000, -6.2),
        (2001, -7.1),
        (2002, -16.8),
        (2003, 25.3),
        (2004, 3.1),
        (2005, -0.6),
        (2006, 16.3),
        (2007, 6.4),
        (2008, -33.8),
        (2009, 18.8),
        (2010, 11.0),
        (2011, 5.5),
        (2012, 7.3),
        (2013, 26.5),
        (2014, 7.5),
        (2015, -2.2),
        (2016, 13.4),
        (2017, 25.1),
        (2018, -5.6),
        (2019, 22.3),
        (2020, 7.2),
        (2021, 18.7),
        (2022, -8.8),
        (2023, 13.7),
        (2024, 12.9),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("sp500".parse::<Benchmark>().unwrap(), Benchmark::Sp500);
        assert_eq!("S&P 500".parse::<Benchmark>().unwrap(), Benchmark::Sp500);
        assert_eq!("NASDAQ".parse::<Benchmark>().unwrap(), Benchmark::Nasdaq);
        assert_eq!("djia".parse::<Benchmark>().unwrap(), Benchmark::DowJones);
        assert!("ftse".parse::<Benchmark>().is_err());
    }

    #[test]
    fn test_each_benchmark_has_its_own_table() {
        let year = 2022;
        let returns: Vec<f64> = Benchmark::all()
            .iter()
            .map(|b| b.annual_returns().rate(year).unwrap())
            .collect();
        assert_ne!(returns[0], returns[1]);
        assert_ne!(returns[1], returns[2]);
    }

    #[test]
    fn test_missing_years_are_absent_not_zero() {
        assert!(Benchmark::Nasdaq.annual_returns().rate(1980).is_none());
    }
}
