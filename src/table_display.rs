use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;

use screener_cli::api_client::{AiAnalysis, Stock};
use screener_cli::format::{format_currency, format_percent, format_ratio, Sentiment};

pub fn display_stocks(stocks: &[Stock]) {
    if stocks.is_empty() {
        println!("{}", "No stocks found.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(
        [
            "Symbol", "Name", "Sector", "Mkt Cap", "P/E", "P/B", "Div Yld", "D/E", "ROE", "Price",
        ]
        .iter()
        .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for stock in stocks {
        table.add_row(vec![
            stock.symbol.clone(),
            stock.name.clone(),
            stock.sector.clone().unwrap_or_default(),
            format_currency(stock.market_cap),
            format_ratio(stock.pe_ratio),
            format_ratio(stock.pb_ratio),
            format_percent(stock.dividend_yield),
            format_ratio(stock.debt_to_equity),
            format_percent(stock.roe),
            format_ratio(stock.current_price),
        ]);
    }

    println!("{table}");
    println!("\n{}", format!("{} stocks", stocks.len()).green());
}

pub fn display_stock_detail(stock: &Stock) {
    println!(
        "\n{}  {}",
        stock.symbol.clone().bold(),
        stock.name.clone().cyan()
    );
    if let Some(sector) = &stock.sector {
        println!("Sector: {}", sector);
    }
    if let Some(industry) = &stock.industry {
        println!("Industry: {}", industry);
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["Market Cap", "P/E", "P/B", "Div Yld", "D/E", "ROE", "Price"]
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );
    table.add_row(vec![
        format_currency(stock.market_cap),
        format_ratio(stock.pe_ratio),
        format_ratio(stock.pb_ratio),
        format_percent(stock.dividend_yield),
        format_ratio(stock.debt_to_equity),
        format_percent(stock.roe),
        format_ratio(stock.current_price),
    ]);
    println!("{table}");
}

pub fn display_analysis(analysis: &AiAnalysis) {
    let sentiment = Sentiment::from_score(analysis.sentiment_score);
    let label = match sentiment {
        Sentiment::Positive => format!("{}", sentiment.label().green().bold()),
        Sentiment::Neutral => format!("{}", sentiment.label().yellow().bold()),
        Sentiment::Negative => format!("{}", sentiment.label().red().bold()),
    };
    let score = analysis
        .sentiment_score
        .map(|s| format!(" (score {:.2})", s))
        .unwrap_or_default();
    println!("\nSentiment: {}{}", label, score);

    if let Some(summary) = &analysis.executive_summary {
        println!("\n{}", "Executive Summary".bold());
        println!("{}", summary);
    }

    let highlights = analysis.highlights();
    if !highlights.is_empty() {
        println!("\n{}", "Key Highlights".bold());
        for highlight in highlights {
            println!("  - {}", highlight);
        }
    }

    if let Some(risk) = &analysis.risk_assessment {
        println!("\n{}", "Risk Assessment".bold());
        println!("{}", risk);
    }

    let flags = analysis.flags();
    if flags.is_empty() {
        println!("\n{}", "No red flags identified".green());
    } else {
        println!("\n{}", "Red Flags".red().bold());
        for flag in flags {
            println!("  {}: {}", flag.flag_type.clone().red(), flag.description);
        }
    }
}
