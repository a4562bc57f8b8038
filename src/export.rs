use anyhow::Result;
use std::path::Path;

use crate::api_client::Stock;

/// Write screening/watchlist rows to a CSV file. Missing metrics become
/// empty cells rather than "N/A" so the file stays spreadsheet-friendly.
pub fn export_stocks_csv<P: AsRef<Path>>(stocks: &[Stock], path: P) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "symbol",
        "name",
        "sector",
        "industry",
        "market_cap",
        "pe_ratio",
        "pb_ratio",
        "dividend_yield",
        "debt_to_equity",
        "roe",
        "current_price",
    ])?;

    let cell = |v: Option<f64>| v.map(|n| n.to_string()).unwrap_or_default();

    for stock in stocks {
        wtr.write_record([
            stock.symbol.clone(),
            stock.name.clone(),
            stock.sector.clone().unwrap_or_default(),
            stock.industry.clone().unwrap_or_default(),
            cell(stock.market_cap),
            cell(stock.pe_ratio),
            cell(stock.pb_ratio),
            cell(stock.dividend_yield),
            cell(stock.debt_to_equity),
            cell(stock.roe),
            cell(stock.current_price),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let stocks = vec![Stock {
            id: 1,
            symbol: "AAPL".to_string(),
            name: "Apple Inc".to_string(),
            sector: Some("Technology".to_string()),
            industry: None,
            market_cap: Some(3e12),
            pe_ratio: Some(30.5),
            pb_ratio: None,
            dividend_yield: Some(0.005),
            debt_to_equity: None,
            roe: None,
            current_price: Some(190.0),
            created_at: String::new(),
            updated_at: None,
        }];

        export_stocks_csv(&stocks, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("symbol,name,sector"));
        let row = lines.next().unwrap();
        assert!(row.contains("AAPL"));
        assert!(row.contains("30.5"));
        // absent pb_ratio is an empty cell
        assert!(row.contains(",,"));
    }
}
