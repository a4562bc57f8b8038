use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::api_client::Stock;
use crate::format::{format_currency, format_percent, format_ratio};

/// A navigable table of stocks, used for both screening results and the
/// watchlist. Rows can be dropped locally without a reload (watchlist
/// removal is an optimistic filter over already-fetched data).
pub struct StockTable {
    stocks: Vec<Stock>,
    state: TableState,
}

impl StockTable {
    pub fn new() -> Self {
        Self {
            stocks: Vec::new(),
            state: TableState::default(),
        }
    }

    pub fn stocks(&self) -> &[Stock] {
        &self.stocks
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn set_stocks(&mut self, stocks: Vec<Stock>) {
        let select = if stocks.is_empty() { None } else { Some(0) };
        self.stocks = stocks;
        self.state.select(select);
    }

    pub fn selected_stock(&self) -> Option<&Stock> {
        self.state.selected().and_then(|i| self.stocks.get(i))
    }

    pub fn next_row(&mut self) {
        if self.stocks.is_empty() {
            return;
        }
        let current = self.state.selected().unwrap_or(0);
        let next = if current + 1 < self.stocks.len() {
            current + 1
        } else {
            0
        };
        self.state.select(Some(next));
    }

    pub fn prev_row(&mut self) {
        if self.stocks.is_empty() {
            return;
        }
        let current = self.state.selected().unwrap_or(0);
        let prev = if current == 0 {
            self.stocks.len() - 1
        } else {
            current - 1
        };
        self.state.select(Some(prev));
    }

    /// Drop a symbol from the local list, keeping the selection on a valid
    /// row. Returns false when the symbol was not present.
    pub fn remove_symbol(&mut self, symbol: &str) -> bool {
        let before = self.stocks.len();
        self.stocks.retain(|s| s.symbol != symbol);
        if self.stocks.len() == before {
            return false;
        }
        if self.stocks.is_empty() {
            self.state.select(None);
        } else if let Some(selected) = self.state.selected() {
            if selected >= self.stocks.len() {
                self.state.select(Some(self.stocks.len() - 1));
            }
        }
        true
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, title: &str, compact: bool) {
        if self.stocks.is_empty() {
            let empty = Paragraph::new("No stocks to display")
                .block(Block::default().borders(Borders::ALL).title(title.to_string()));
            f.render_widget(empty, area);
            return;
        }

        let header_cells = [
            "Symbol", "Name", "Sector", "Mkt Cap", "P/E", "P/B", "Div Yld", "Price",
        ]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
        let header = Row::new(header_cells)
            .height(1)
            .bottom_margin(if compact { 0 } else { 1 });

        let rows: Vec<Row> = self
            .stocks
            .iter()
            .map(|stock| {
                Row::new(vec![
                    Cell::from(stock.symbol.clone())
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                    Cell::from(stock.name.clone()),
                    Cell::from(stock.sector.clone().unwrap_or_default()),
                    Cell::from(format_currency(stock.market_cap)),
                    Cell::from(format_ratio(stock.pe_ratio)),
                    Cell::from(format_ratio(stock.pb_ratio)),
                    Cell::from(format_percent(stock.dividend_yield)),
                    Cell::from(format_ratio(stock.current_price)),
                ])
                .height(1)
            })
            .collect();

        let widths = [
            Constraint::Length(8),
            Constraint::Min(18),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(10),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{} ({} stocks)", title, self.stocks.len())),
            )
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.state);
    }
}

impl Default for StockTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(id: i64, symbol: &str) -> Stock {
        Stock {
            id,
            symbol: symbol.to_string(),
            name: format!("{} Inc", symbol),
            sector: Some("Technology".to_string()),
            industry: None,
            market_cap: Some(1e9),
            pe_ratio: Some(20.0),
            pb_ratio: None,
            dividend_yield: None,
            debt_to_equity: None,
            roe: None,
            current_price: Some(100.0),
            created_at: String::new(),
            updated_at: None,
        }
    }

    #[test]
    fn test_remove_symbol_is_local_filter() {
        let mut table = StockTable::new();
        table.set_stocks(vec![stock(1, "AAPL"), stock(2, "MSFT"), stock(3, "GOOG")]);

        assert!(table.remove_symbol("MSFT"));
        let symbols: Vec<&str> = table.stocks().iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "GOOG"]);

        assert!(!table.remove_symbol("TSLA"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_remove_clamps_selection() {
        let mut table = StockTable::new();
        table.set_stocks(vec![stock(1, "AAPL"), stock(2, "MSFT")]);
        table.next_row(); // select MSFT

        table.remove_symbol("MSFT");
        assert_eq!(table.selected_stock().unwrap().symbol, "AAPL");

        table.remove_symbol("AAPL");
        assert!(table.selected_stock().is_none());
    }

    #[test]
    fn test_row_navigation_wraps() {
        let mut table = StockTable::new();
        table.set_stocks(vec![stock(1, "AAPL"), stock(2, "MSFT")]);

        assert_eq!(table.selected_stock().unwrap().symbol, "AAPL");
        table.next_row();
        assert_eq!(table.selected_stock().unwrap().symbol, "MSFT");
        table.next_row();
        assert_eq!(table.selected_stock().unwrap().symbol, "AAPL");
        table.prev_row();
        assert_eq!(table.selected_stock().unwrap().symbol, "MSFT");
    }
}
