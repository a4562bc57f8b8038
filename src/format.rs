use ratatui::style::Color;

/// Dollar amount with magnitude suffix: `$2.5B`, `$130.0M`, `$45.2K`,
/// or plain two-decimal dollars below a thousand. Missing values are "N/A".
pub fn format_currency(value: Option<f64>) -> String {
    let num = match value {
        Some(n) => n,
        None => return "N/A".to_string(),
    };
    if num >= 1e9 {
        format!("${:.1}B", num / 1e9)
    } else if num >= 1e6 {
        format!("${:.1}M", num / 1e6)
    } else if num >= 1e3 {
        format!("${:.1}K", num / 1e3)
    } else {
        format!("${:.2}", num)
    }
}

/// Plain two-decimal number for ratios like P/E and debt/equity.
pub fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(n) => format!("{:.2}", n),
        None => "N/A".to_string(),
    }
}

/// Fraction rendered as a percentage (dividend yield, ROE).
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(n) => format!("{:.2}%", n * 100.0),
        None => "N/A".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Scores above 0.2 read positive, below -0.2 negative, everything
    /// else (including a missing score) neutral.
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if s > 0.2 => Sentiment::Positive,
            Some(s) if s < -0.2 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Sentiment::Positive => Color::Green,
            Sentiment::Neutral => Color::Yellow,
            Sentiment::Negative => Color::Red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_magnitudes() {
        assert_eq!(format_currency(Some(2_500_000_000.0)), "$2.5B");
        assert_eq!(format_currency(Some(130_000_000.0)), "$130.0M");
        assert_eq!(format_currency(Some(45_200.0)), "$45.2K");
        assert_eq!(format_currency(Some(999.99)), "$999.99");
        assert_eq!(format_currency(Some(0.5)), "$0.50");
    }

    #[test]
    fn test_currency_boundaries() {
        assert_eq!(format_currency(Some(1e9)), "$1.0B");
        assert_eq!(format_currency(Some(1e6)), "$1.0M");
        assert_eq!(format_currency(Some(1e3)), "$1.0K");
        assert_eq!(format_currency(Some(999.0)), "$999.00");
    }

    #[test]
    fn test_currency_missing() {
        assert_eq!(format_currency(None), "N/A");
    }

    #[test]
    fn test_ratio_and_percent() {
        assert_eq!(format_ratio(Some(23.456)), "23.46");
        assert_eq!(format_ratio(None), "N/A");
        assert_eq!(format_percent(Some(0.0234)), "2.34%");
        assert_eq!(format_percent(None), "N/A");
    }

    #[test]
    fn test_sentiment_thresholds() {
        assert_eq!(Sentiment::from_score(Some(0.5)), Sentiment::Positive);
        assert_eq!(Sentiment::from_score(Some(0.2)), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(Some(-0.2)), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(Some(-0.21)), Sentiment::Negative);
        assert_eq!(Sentiment::from_score(None), Sentiment::Neutral);
    }
}
