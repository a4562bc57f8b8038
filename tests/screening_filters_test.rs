// What actually goes over the wire for /stocks/screen: form values get
// unit-converted, unset bounds disappear from the body entirely.

use screener_cli::api_client::ScreeningFilters;
use screener_cli::ui::forms::{parse_screen_filters, SCREEN_FIELDS};

fn values(fill: &[(usize, &str)]) -> Vec<String> {
    let mut v = vec![String::new(); SCREEN_FIELDS.len()];
    for (i, s) in fill {
        v[*i] = s.to_string();
    }
    v
}

#[test]
fn form_values_convert_to_api_units() {
    let filters = parse_screen_filters(&values(&[
        (0, "100"),   // min market cap, entered in millions
        (2, "5"),     // min P/E
        (3, "25"),    // max P/E
        (6, "3"),     // min dividend yield, entered as percent
        (8, "12.5"),  // min ROE, entered as percent
    ]))
    .unwrap();

    assert_eq!(filters.min_market_cap, Some(100_000_000.0));
    assert_eq!(filters.min_pe_ratio, Some(5.0));
    assert_eq!(filters.max_pe_ratio, Some(25.0));
    assert_eq!(filters.min_dividend_yield, Some(0.03));
    assert_eq!(filters.min_roe, Some(0.125));
}

#[test]
fn request_body_omits_unset_bounds() {
    let filters = parse_screen_filters(&values(&[(2, "5"), (9, "Technology")])).unwrap();
    let body = serde_json::to_value(&filters).unwrap();
    let obj = body.as_object().unwrap();

    assert_eq!(obj.len(), 2);
    assert_eq!(obj["min_pe_ratio"], 5.0);
    assert_eq!(obj["sectors"], serde_json::json!(["Technology"]));
}

#[test]
fn bad_input_never_reaches_the_wire() {
    let err = parse_screen_filters(&values(&[(4, "not-a-number")])).unwrap_err();
    assert!(err.contains("Min P/B Ratio"));
}

#[test]
fn repl_and_form_paths_agree() {
    let from_form = parse_screen_filters(&values(&[(2, "10"), (7, "1.5")])).unwrap();
    let from_repl =
        ScreeningFilters::from_key_values(vec!["min_pe_ratio=10", "max_debt_to_equity=1.5"])
            .unwrap();
    assert_eq!(from_form, from_repl);
}
