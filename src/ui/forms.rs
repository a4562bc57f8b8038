use crossterm::event::{Event, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::api_client::ScreeningFilters;

/// A vertical stack of labeled text fields driven by `tui_input`.
/// One field has focus at a time; key events go to the focused field.
pub struct InputForm {
    labels: Vec<&'static str>,
    inputs: Vec<Input>,
    masked: Vec<bool>,
    selected: usize,
}

impl InputForm {
    pub fn new(labels: Vec<&'static str>) -> Self {
        let masked = labels
            .iter()
            .map(|l| l.to_lowercase().contains("password"))
            .collect();
        let inputs = labels.iter().map(|_| Input::default()).collect();
        Self {
            labels,
            inputs,
            masked,
            selected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % self.labels.len();
    }

    pub fn prev_field(&mut self) {
        self.selected = if self.selected == 0 {
            self.labels.len() - 1
        } else {
            self.selected - 1
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.inputs[self.selected].handle_event(&Event::Key(key));
    }

    pub fn value(&self, index: usize) -> &str {
        self.inputs[index].value()
    }

    pub fn set_value(&mut self, index: usize, value: &str) {
        self.inputs[index] = Input::from(value.to_string());
    }

    pub fn values(&self) -> Vec<String> {
        self.inputs.iter().map(|i| i.value().to_string()).collect()
    }

    pub fn clear(&mut self) {
        for input in &mut self.inputs {
            *input = Input::default();
        }
        self.selected = 0;
    }

    pub fn render(&self, f: &mut Frame, area: Rect, focused: bool) {
        let constraints: Vec<Constraint> =
            self.labels.iter().map(|_| Constraint::Length(3)).collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (i, label) in self.labels.iter().enumerate() {
            let is_active = focused && i == self.selected;
            let style = if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            };
            let shown = if self.masked[i] {
                "*".repeat(self.inputs[i].value().chars().count())
            } else {
                self.inputs[i].value().to_string()
            };
            let field = Paragraph::new(shown)
                .style(style)
                .block(Block::default().borders(Borders::ALL).title(*label));
            f.render_widget(field, rows[i]);

            if is_active {
                f.set_cursor_position((
                    rows[i].x + self.inputs[i].visual_cursor() as u16 + 1,
                    rows[i].y + 1,
                ));
            }
        }
    }
}

pub fn login_form() -> InputForm {
    InputForm::new(vec!["Username", "Password"])
}

pub fn register_form() -> InputForm {
    InputForm::new(vec!["Email", "Username", "Password"])
}

// Field order for the screening form. parse_screen_filters relies on it.
pub const SCREEN_FIELDS: [&str; 10] = [
    "Min Market Cap (M)",
    "Max Market Cap (M)",
    "Min P/E Ratio",
    "Max P/E Ratio",
    "Min P/B Ratio",
    "Max P/B Ratio",
    "Min Dividend Yield (%)",
    "Max Debt/Equity",
    "Min ROE (%)",
    "Sectors (comma-separated)",
];

pub fn screen_form() -> InputForm {
    InputForm::new(SCREEN_FIELDS.to_vec())
}

fn parse_bound(label: &str, raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| format!("{}: '{}' is not a number", label, raw))
}

/// Turn the screening form's raw field values into API filters.
///
/// Same unit conversions the original form applied: market caps are
/// entered in millions, yields and ROE as percentages.
pub fn parse_screen_filters(values: &[String]) -> Result<ScreeningFilters, String> {
    if values.len() != SCREEN_FIELDS.len() {
        return Err("screening form is incomplete".to_string());
    }

    let sectors = values[9]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    Ok(ScreeningFilters {
        min_market_cap: parse_bound(SCREEN_FIELDS[0], &values[0])?.map(|v| v * 1e6),
        max_market_cap: parse_bound(SCREEN_FIELDS[1], &values[1])?.map(|v| v * 1e6),
        min_pe_ratio: parse_bound(SCREEN_FIELDS[2], &values[2])?,
        max_pe_ratio: parse_bound(SCREEN_FIELDS[3], &values[3])?,
        min_pb_ratio: parse_bound(SCREEN_FIELDS[4], &values[4])?,
        max_pb_ratio: parse_bound(SCREEN_FIELDS[5], &values[5])?,
        min_dividend_yield: parse_bound(SCREEN_FIELDS[6], &values[6])?.map(|v| v / 100.0),
        max_dividend_yield: None,
        min_debt_to_equity: None,
        max_debt_to_equity: parse_bound(SCREEN_FIELDS[7], &values[7])?,
        min_roe: parse_bound(SCREEN_FIELDS[8], &values[8])?.map(|v| v / 100.0),
        max_roe: None,
        sectors: if sectors.is_empty() {
            None
        } else {
            Some(sectors)
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_values() -> Vec<String> {
        vec![String::new(); SCREEN_FIELDS.len()]
    }

    #[test]
    fn test_empty_form_yields_empty_filters() {
        let filters = parse_screen_filters(&blank_values()).unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn test_unit_conversions() {
        let mut values = blank_values();
        values[0] = "500".to_string(); // min market cap, millions
        values[6] = "2.5".to_string(); // min dividend yield, percent
        values[8] = "15".to_string(); // min ROE, percent

        let filters = parse_screen_filters(&values).unwrap();
        assert_eq!(filters.min_market_cap, Some(500_000_000.0));
        assert_eq!(filters.min_dividend_yield, Some(0.025));
        assert_eq!(filters.min_roe, Some(0.15));
    }

    #[test]
    fn test_sectors_split_and_trimmed() {
        let mut values = blank_values();
        values[9] = "Technology, Energy ,".to_string();

        let filters = parse_screen_filters(&values).unwrap();
        assert_eq!(
            filters.sectors,
            Some(vec!["Technology".to_string(), "Energy".to_string()])
        );
    }

    #[test]
    fn test_invalid_number_reports_field() {
        let mut values = blank_values();
        values[2] = "abc".to_string();

        let err = parse_screen_filters(&values).unwrap_err();
        assert!(err.contains("Min P/E Ratio"));
        assert!(err.contains("abc"));
    }

    #[test]
    fn test_form_field_cycling() {
        let mut form = login_form();
        assert_eq!(form.selected(), 0);
        form.next_field();
        assert_eq!(form.selected(), 1);
        form.next_field();
        assert_eq!(form.selected(), 0);
        form.prev_field();
        assert_eq!(form.selected(), 1);
    }
}
