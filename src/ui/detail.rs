use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::api_client::{AiAnalysis, Stock};
use crate::format::{format_currency, format_percent, format_ratio, Sentiment};

/// Where the AI analysis pane currently stands for the shown stock.
#[derive(Debug, Clone)]
pub enum AnalysisUi {
    /// 202 received; polling on the configured interval.
    Polling { attempts: u32 },
    Ready(Box<AiAnalysis>),
    Failed(String),
}

pub struct DetailState {
    pub symbol: String,
    pub stock: Option<Stock>,
    pub analysis: AnalysisUi,
}

impl DetailState {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            stock: None,
            analysis: AnalysisUi::Polling { attempts: 0 },
        }
    }
}

pub fn render_detail(f: &mut Frame, area: Rect, detail: &DetailState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(6)])
        .split(area);

    render_fundamentals(f, chunks[0], detail);
    render_analysis(f, chunks[1], detail);
}

fn render_fundamentals(f: &mut Frame, area: Rect, detail: &DetailState) {
    let title = match &detail.stock {
        Some(stock) => format!("{} - {}", stock.symbol, stock.name),
        None => detail.symbol.clone(),
    };

    let lines = match &detail.stock {
        Some(stock) => vec![
            Line::from(vec![
                Span::styled("Sector: ", Style::default().fg(Color::Gray)),
                Span::raw(stock.sector.clone().unwrap_or_else(|| "N/A".to_string())),
                Span::raw("   "),
                Span::styled("Industry: ", Style::default().fg(Color::Gray)),
                Span::raw(stock.industry.clone().unwrap_or_else(|| "N/A".to_string())),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Market Cap  ", Style::default().fg(Color::Gray)),
                Span::raw(format!("{:<12}", format_currency(stock.market_cap))),
                Span::styled("P/E  ", Style::default().fg(Color::Gray)),
                Span::raw(format!("{:<10}", format_ratio(stock.pe_ratio))),
                Span::styled("P/B  ", Style::default().fg(Color::Gray)),
                Span::raw(format_ratio(stock.pb_ratio)),
            ]),
            Line::from(vec![
                Span::styled("Price       ", Style::default().fg(Color::Gray)),
                Span::raw(format!("{:<12}", format_ratio(stock.current_price))),
                Span::styled("Div  ", Style::default().fg(Color::Gray)),
                Span::raw(format!("{:<10}", format_percent(stock.dividend_yield))),
                Span::styled("ROE  ", Style::default().fg(Color::Gray)),
                Span::raw(format_percent(stock.roe)),
            ]),
            Line::from(vec![
                Span::styled("Debt/Equity ", Style::default().fg(Color::Gray)),
                Span::raw(format_ratio(stock.debt_to_equity)),
            ]),
        ],
        None => vec![Line::from("Loading stock data...")],
    };

    let pane = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    f.render_widget(pane, area);
}

fn render_analysis(f: &mut Frame, area: Rect, detail: &DetailState) {
    let lines = match &detail.analysis {
        AnalysisUi::Polling { attempts } => vec![
            Line::from(Span::styled(
                "Generating AI analysis...",
                Style::default().fg(Color::Cyan),
            )),
            Line::from(format!(
                "Checked {} time(s); the report is built server-side and can take a while.",
                attempts
            )),
        ],
        AnalysisUi::Failed(message) => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        ))],
        AnalysisUi::Ready(analysis) => analysis_lines(analysis),
    };

    let pane = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("AI Analysis"))
        .wrap(Wrap { trim: true });
    f.render_widget(pane, area);
}

fn analysis_lines(analysis: &AiAnalysis) -> Vec<Line<'static>> {
    let sentiment = Sentiment::from_score(analysis.sentiment_score);
    let mut lines = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("Sentiment: ", Style::default().fg(Color::Gray)),
        Span::styled(
            sentiment.label(),
            Style::default()
                .fg(sentiment.color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(match analysis.sentiment_score {
            Some(score) => format!("  (score {:.2})", score),
            None => String::new(),
        }),
    ]));
    lines.push(Line::from(""));

    if let Some(summary) = &analysis.executive_summary {
        lines.push(Line::from(Span::styled(
            "Executive Summary",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(summary.clone()));
        lines.push(Line::from(""));
    }

    let highlights = analysis.highlights();
    if !highlights.is_empty() {
        lines.push(Line::from(Span::styled(
            "Key Highlights",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for highlight in highlights {
            lines.push(Line::from(format!("  - {}", highlight)));
        }
        lines.push(Line::from(""));
    }

    if let Some(risk) = &analysis.risk_assessment {
        lines.push(Line::from(Span::styled(
            "Risk Assessment",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(risk.clone()));
        lines.push(Line::from(""));
    }

    let flags = analysis.flags();
    if flags.is_empty() {
        lines.push(Line::from(Span::styled(
            "No red flags identified",
            Style::default().fg(Color::Green),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Red Flags",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        for flag in flags {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {}: ", flag.flag_type),
                    Style::default().fg(Color::Red),
                ),
                Span::raw(flag.description),
            ]));
        }
    }

    lines
}
