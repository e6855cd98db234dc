use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{bail, Context, Result};
use frontier_rs::{PortfolioEngine, PortfolioEngineConfig, PortfolioResult};
use ndarray::Array2;
use prettytable::{row, Table};

fn main() -> Result<()> {
  let path = env::args()
    .nth(1)
    .context("usage: frontier-rs <prices.csv> [risk_free]")?;
  let risk_free: f64 = match env::args().nth(2) {
    Some(rf) => rf.parse().context("risk_free must be a decimal")?,
    None => 0.02,
  };

  let (tickers, prices) = read_price_table(&path)?;
  println!(
    "Loaded {} price rows for {} assets from {path}",
    prices.nrows(),
    tickers.len()
  );

  let engine = PortfolioEngine::new(PortfolioEngineConfig {
    risk_free,
    ..Default::default()
  });
  let report = engine.analyze(&prices, None)?;

  match &report.min_variance {
    Ok(res) => print_portfolio("Minimum variance", &tickers, res),
    Err(err) => println!("Minimum variance failed: {err}"),
  }
  match &report.max_sharpe {
    Ok(res) => print_portfolio("Maximum Sharpe", &tickers, res),
    Err(err) => println!("Maximum Sharpe failed: {err}"),
  }

  println!("\nEfficient frontier ({} points):", report.frontier.len());
  let mut table = Table::new();
  table.add_row(row!["target return", "volatility"]);
  for p in &report.frontier {
    table.add_row(row![
      format!("{:.4}", p.target_return),
      format!("{:.4}", p.volatility)
    ]);
  }
  table.printstd();

  Ok(())
}

fn print_portfolio(label: &str, tickers: &[String], res: &PortfolioResult) {
  println!(
    "\n{label}: return {:.4}, volatility {:.4}, sharpe {:.4}",
    res.expected_return, res.volatility, res.sharpe
  );
  let mut table = Table::new();
  table.add_row(row!["asset", "weight"]);
  for (ticker, w) in tickers.iter().zip(res.weights.iter()) {
    table.add_row(row![ticker, format!("{w:.4}")]);
  }
  table.printstd();
}

/// Read a CSV price table: a header of `date,TICKER,...` followed by one row
/// per period. Empty or unparsable price cells become NaN and the whole row
/// is dropped by the estimator.
fn read_price_table(path: &str) -> Result<(Vec<String>, Array2<f64>)> {
  let file = File::open(path).with_context(|| format!("opening {path}"))?;
  let reader = BufReader::new(file);
  let mut lines = reader.lines();

  let header = lines.next().context("price file is empty")??;
  let tickers: Vec<String> = header
    .split(',')
    .skip(1)
    .map(|s| s.trim().to_string())
    .collect();
  if tickers.is_empty() {
    bail!("header has no asset columns");
  }

  let mut data = Vec::new();
  let mut rows = 0usize;
  for line in lines {
    let line = line?;
    if line.trim().is_empty() {
      continue;
    }
    let cells: Vec<&str> = line.split(',').collect();
    if cells.len() != tickers.len() + 1 {
      bail!(
        "row {} has {} cells, expected {}",
        rows + 2,
        cells.len(),
        tickers.len() + 1
      );
    }
    for cell in &cells[1..] {
      data.push(cell.trim().parse::<f64>().unwrap_or(f64::NAN));
    }
    rows += 1;
  }

  let prices = Array2::from_shape_vec((rows, tickers.len()), data)?;
  Ok((tickers, prices))
}
