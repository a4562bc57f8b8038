use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};

/// Bearer token response from `/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
}

/// One stock's fundamentals as the service returns them. All metric fields
/// are optional - the provider may not have them for every symbol.
#[derive(Debug, Clone, Deserialize)]
pub struct Stock {
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub roe: Option<f64>,
    pub current_price: Option<f64>,
    #[serde(default)]
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// Fundamental-threshold filters for `/stocks/screen`. Unset bounds are
/// omitted from the request body entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScreeningFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_pe_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pe_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_pb_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pb_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_dividend_yield: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_dividend_yield: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_debt_to_equity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_debt_to_equity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_roe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_roe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sectors: Option<Vec<String>>,
}

impl ScreeningFilters {
    pub fn is_empty(&self) -> bool {
        serde_json::to_value(self)
            .map(|v| v.as_object().map_or(true, |o| o.is_empty()))
            .unwrap_or(true)
    }

    /// Build filters from `field=value` pairs, e.g.
    /// `min_pe_ratio=5 max_pe_ratio=20 sectors=Technology,Energy`.
    /// Numeric values are raw API units (dollars, fractions).
    pub fn from_key_values<'a, I>(pairs: I) -> ApiResult<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut filters = ScreeningFilters::default();
        for pair in pairs {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ApiError::Validation(format!("expected field=value, got '{}'", pair))
            })?;
            if key == "sectors" {
                let sectors: Vec<String> = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                filters.sectors = if sectors.is_empty() {
                    None
                } else {
                    Some(sectors)
                };
                continue;
            }
            let number: f64 = value.parse().map_err(|_| {
                ApiError::Validation(format!("{}: '{}' is not a number", key, value))
            })?;
            let slot = match key {
                "min_market_cap" => &mut filters.min_market_cap,
                "max_market_cap" => &mut filters.max_market_cap,
                "min_pe_ratio" => &mut filters.min_pe_ratio,
                "max_pe_ratio" => &mut filters.max_pe_ratio,
                "min_pb_ratio" => &mut filters.min_pb_ratio,
                "max_pb_ratio" => &mut filters.max_pb_ratio,
                "min_dividend_yield" => &mut filters.min_dividend_yield,
                "max_dividend_yield" => &mut filters.max_dividend_yield,
                "min_debt_to_equity" => &mut filters.min_debt_to_equity,
                "max_debt_to_equity" => &mut filters.max_debt_to_equity,
                "min_roe" => &mut filters.min_roe,
                "max_roe" => &mut filters.max_roe,
                other => {
                    return Err(ApiError::Validation(format!(
                        "unknown screening field '{}'",
                        other
                    )))
                }
            };
            *slot = Some(number);
        }
        Ok(filters)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchlistResponse {
    pub stocks: Vec<Stock>,
}

/// Server-generated narrative report for one stock. `sentiment_highlights`
/// and `red_flags` arrive as JSON-encoded strings, a quirk of the service
/// schema - use the accessor methods rather than the raw fields.
#[derive(Debug, Clone, Deserialize)]
pub struct AiAnalysis {
    pub id: i64,
    pub stock_id: i64,
    pub executive_summary: Option<String>,
    pub sentiment_score: Option<f64>,
    pub sentiment_highlights: Option<String>,
    pub risk_assessment: Option<String>,
    pub red_flags: Option<String>,
    #[serde(default)]
    pub analysis_date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedFlag {
    #[serde(rename = "type")]
    pub flag_type: String,
    pub description: String,
}

impl AiAnalysis {
    /// Decoded highlight bullet points, empty when absent or malformed.
    pub fn highlights(&self) -> Vec<String> {
        self.sentiment_highlights
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    /// Decoded red flags, empty when absent or malformed.
    pub fn flags(&self) -> Vec<RedFlag> {
        self.red_flags
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }
}

/// Outcome of one analysis request. A 202 means the report is still being
/// generated server-side and should be requested again later.
#[derive(Debug, Clone)]
pub enum AnalysisStatus {
    Ready(AiAnalysis),
    Processing,
}

fn symbol_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9.\-]{0,9}$").unwrap())
}

/// Uppercase and validate a ticker symbol before it goes into a URL path.
pub fn normalize_symbol(symbol: &str) -> ApiResult<String> {
    let trimmed = symbol.trim();
    if symbol_pattern().is_match(trimmed) {
        Ok(trimmed.to_uppercase())
    } else {
        Err(ApiError::Validation(format!(
            "'{}' is not a valid ticker symbol",
            trimmed
        )))
    }
}

/// Blocking client for the stock-screening REST API.
///
/// Every request carries `Authorization: Bearer <token>` once a session
/// token has been set.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client: Client::new(),
        }
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Map non-success statuses to error kinds, pulling the `detail`
    /// message out of the body when the server provides one.
    fn check(&self, response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() || status == StatusCode::ACCEPTED {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(target: "api", "request rejected with {}", status);
            return Err(ApiError::Unauthorized);
        }
        let message = response
            .text()
            .ok()
            .and_then(|body| {
                serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
                    .or(Some(body))
            })
            .unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    pub fn login(&self, username: &str, password: &str) -> ApiResult<AuthToken> {
        info!(target: "api", "login as {}", username);
        let body = serde_json::json!({ "username": username, "password": password });
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&body)
            .send()?;
        let token: AuthToken = self.check(response)?.json()?;
        Ok(token)
    }

    pub fn register(&self, email: &str, username: &str, password: &str) -> ApiResult<User> {
        info!(target: "api", "register {}", username);
        let body = serde_json::json!({
            "email": email,
            "username": username,
            "password": password,
        });
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(&body)
            .send()?;
        let user: User = self.check(response)?.json()?;
        Ok(user)
    }

    pub fn search_stock(&self, symbol: &str) -> ApiResult<Stock> {
        let symbol = normalize_symbol(symbol)?;
        debug!(target: "api", "search {}", symbol);
        let response = self
            .authorize(
                self.client
                    .get(self.url(&format!("/stocks/search/{}", symbol))),
            )
            .send()?;
        let stock: Stock = self.check(response)?.json()?;
        Ok(stock)
    }

    pub fn screen_stocks(&self, filters: &ScreeningFilters) -> ApiResult<Vec<Stock>> {
        debug!(target: "api", "screen with {:?}", filters);
        let response = self
            .authorize(self.client.post(self.url("/stocks/screen")).json(filters))
            .send()?;
        let stocks: Vec<Stock> = self.check(response)?.json()?;
        info!(target: "api", "screen returned {} stocks", stocks.len());
        Ok(stocks)
    }

    pub fn get_watchlist(&self) -> ApiResult<Vec<Stock>> {
        debug!(target: "api", "fetch watchlist");
        let response = self
            .authorize(self.client.get(self.url("/stocks/watchlist")))
            .send()?;
        let list: WatchlistResponse = self.check(response)?.json()?;
        Ok(list.stocks)
    }

    pub fn add_to_watchlist(&self, symbol: &str) -> ApiResult<()> {
        let symbol = normalize_symbol(symbol)?;
        info!(target: "api", "watchlist add {}", symbol);
        let response = self
            .authorize(
                self.client
                    .post(self.url(&format!("/stocks/watchlist/add/{}", symbol))),
            )
            .send()?;
        self.check(response)?;
        Ok(())
    }

    pub fn remove_from_watchlist(&self, symbol: &str) -> ApiResult<()> {
        let symbol = normalize_symbol(symbol)?;
        info!(target: "api", "watchlist remove {}", symbol);
        let response = self
            .authorize(
                self.client
                    .delete(self.url(&format!("/stocks/watchlist/remove/{}", symbol))),
            )
            .send()?;
        self.check(response)?;
        Ok(())
    }

    /// One analysis request. 202 maps to `Processing` - the caller owns
    /// the retry schedule (see `poller::AnalysisPoller`).
    pub fn get_analysis(&self, symbol: &str) -> ApiResult<AnalysisStatus> {
        let symbol = normalize_symbol(symbol)?;
        debug!(target: "api", "fetch analysis for {}", symbol);
        let response = self
            .authorize(
                self.client
                    .get(self.url(&format!("/stocks/{}/analysis", symbol))),
            )
            .send()?;
        let response = self.check(response)?;
        if response.status() == StatusCode::ACCEPTED {
            debug!(target: "api", "analysis for {} still processing", symbol);
            return Ok(AnalysisStatus::Processing);
        }
        let analysis: AiAnalysis = response.json()?;
        Ok(AnalysisStatus::Ready(analysis))
    }

    pub fn populate_stocks(&self) -> ApiResult<()> {
        info!(target: "api", "trigger server-side populate");
        let response = self
            .authorize(self.client.post(self.url("/stocks/populate")))
            .send()?;
        self.check(response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(
            client.url("/stocks/populate"),
            "http://localhost:8000/api/v1/stocks/populate"
        );
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("aapl").unwrap(), "AAPL");
        assert_eq!(normalize_symbol(" brk.b ").unwrap(), "BRK.B");
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("NOT A SYMBOL").is_err());
        assert!(normalize_symbol("../etc/passwd").is_err());
    }

    #[test]
    fn test_filters_skip_unset_bounds() {
        let filters = ScreeningFilters {
            min_pe_ratio: Some(5.0),
            max_pe_ratio: Some(20.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&filters).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(obj.contains_key("min_pe_ratio"));
        assert!(!obj.contains_key("min_market_cap"));
    }

    #[test]
    fn test_empty_filters_serialize_empty() {
        let filters = ScreeningFilters::default();
        assert!(filters.is_empty());
        assert_eq!(serde_json::to_string(&filters).unwrap(), "{}");
    }

    #[test]
    fn test_filters_from_key_values() {
        let filters = ScreeningFilters::from_key_values(vec![
            "min_pe_ratio=5",
            "max_pe_ratio=20",
            "sectors=Technology, Energy",
        ])
        .unwrap();
        assert_eq!(filters.min_pe_ratio, Some(5.0));
        assert_eq!(filters.max_pe_ratio, Some(20.0));
        assert_eq!(
            filters.sectors,
            Some(vec!["Technology".to_string(), "Energy".to_string()])
        );
    }

    #[test]
    fn test_filters_reject_unknown_field() {
        let err = ScreeningFilters::from_key_values(vec!["min_eps=3"]).unwrap_err();
        assert!(err.to_string().contains("min_eps"));

        let err = ScreeningFilters::from_key_values(vec!["min_pe_ratio"]).unwrap_err();
        assert!(err.to_string().contains("field=value"));

        let err = ScreeningFilters::from_key_values(vec!["min_pe_ratio=low"]).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_analysis_highlight_and_flag_decoding() {
        let analysis = AiAnalysis {
            id: 1,
            stock_id: 7,
            executive_summary: Some("Solid balance sheet".to_string()),
            sentiment_score: Some(0.4),
            sentiment_highlights: Some(r#"["strong cash flow","low debt"]"#.to_string()),
            risk_assessment: None,
            red_flags: Some(
                r#"[{"type":"valuation","description":"P/E above sector"}]"#.to_string(),
            ),
            analysis_date: "2025-03-01T12:00:00".to_string(),
        };
        assert_eq!(analysis.highlights(), vec!["strong cash flow", "low debt"]);
        let flags = analysis.flags();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].flag_type, "valuation");
    }

    #[test]
    fn test_malformed_flag_blob_is_empty() {
        let analysis = AiAnalysis {
            id: 1,
            stock_id: 7,
            executive_summary: None,
            sentiment_score: None,
            sentiment_highlights: Some("not json".to_string()),
            risk_assessment: None,
            red_flags: None,
            analysis_date: String::new(),
        };
        assert!(analysis.highlights().is_empty());
        assert!(analysis.flags().is_empty());
    }
}
