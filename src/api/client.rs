/// Stock analysis backend REST client
use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{DashboardError, Result};
use crate::types::{
    Config, FundamentalAnalysis, HealthStatus, StockData, StockSymbol, TechnicalAnalysis,
};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<StockSymbol>,
}

#[derive(Debug, Deserialize)]
struct AllStocksResponse {
    #[serde(default)]
    stocks: Vec<StockSymbol>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Optional range/interval parameters for price and technical queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataQuery {
    pub interval: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DataQuery {
    pub fn with_interval(interval: impl Into<String>) -> Self {
        DataQuery {
            interval: Some(interval.into()),
            ..DataQuery::default()
        }
    }

    /// Query pairs, leaving out unset parameters
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(interval) = &self.interval {
            pairs.push(("interval", interval.clone()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", end.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

/// Map a non-2xx body to the message shown to the user
pub fn error_from_body(status: u16, body: &str) -> DashboardError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => DashboardError::Api { status, detail },
        // FastAPI validation errors carry a list of problems
        Ok(ErrorBody { detail }) if !detail.is_null() => DashboardError::Api {
            status,
            detail: detail.to_string(),
        },
        _ => DashboardError::HttpStatus { status },
    }
}

pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| DashboardError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(DashboardError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(ApiClient { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        ApiClient::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_sec),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DashboardError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = error_from_body(status.as_u16(), &body);
            warn!("GET {} failed: {} ({})", url, err, err.error_code());
            return Err(err);
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Search symbols by code or company name
    pub async fn search_stocks(&self, term: &str) -> Result<Vec<StockSymbol>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(DashboardError::InvalidParameter(
                "search term must not be empty".to_string(),
            ));
        }

        let url = self.endpoint(&["stocks", "search"])?;
        let response: SearchResponse = self.get_json(url, &[("q", term.to_string())]).await?;
        debug!("Search '{}' returned {} results", term, response.results.len());
        Ok(response.results)
    }

    pub async fn all_stocks(&self) -> Result<Vec<StockSymbol>> {
        let url = self.endpoint(&["stocks", "all"])?;
        let response: AllStocksResponse = self.get_json(url, &[]).await?;
        Ok(response.stocks)
    }

    /// Raw OHLCV rows
    pub async fn stock_data(&self, symbol: &str, query: &DataQuery) -> Result<StockData> {
        let symbol = normalize_symbol(symbol)?;
        let url = self.endpoint(&["stock", &symbol])?;
        self.get_json(url, &query.to_pairs()).await
    }

    /// Company profile, passed through as-is
    pub async fn company_info(&self, symbol: &str) -> Result<serde_json::Value> {
        let symbol = normalize_symbol(symbol)?;
        let url = self.endpoint(&["stock", &symbol, "info"])?;
        self.get_json(url, &[]).await
    }

    /// OHLCV rows with indicator columns plus a latest-bar summary
    pub async fn technical_analysis(
        &self,
        symbol: &str,
        query: &DataQuery,
    ) -> Result<TechnicalAnalysis> {
        let symbol = normalize_symbol(symbol)?;
        let url = self.endpoint(&["analysis", "technical", &symbol])?;
        let analysis: TechnicalAnalysis = self.get_json(url, &query.to_pairs()).await?;
        debug!("Technical analysis for {}: {} rows", analysis.symbol, analysis.data.len());
        Ok(analysis)
    }

    pub async fn fundamental_analysis(&self, symbol: &str) -> Result<FundamentalAnalysis> {
        let symbol = normalize_symbol(symbol)?;
        let url = self.endpoint(&["analysis", "fundamental", &symbol])?;
        self.get_json(url, &[]).await
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint(&["health"])?;
        self.get_json(url, &[]).await
    }
}

fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(DashboardError::InvalidParameter("symbol must not be empty".to_string()));
    }
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&format!("{}/api/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_error_from_body() {
        let err = error_from_body(404, r#"{"detail":"No data found for symbol"}"#);
        assert_eq!(err.user_message(), "No data found for symbol");

        let err = error_from_body(500, "<html>Internal Server Error</html>");
        assert!(matches!(err, DashboardError::HttpStatus { status: 500 }));
        assert_eq!(err.user_message(), "HTTP error! status: 500");

        let err = error_from_body(422, r#"{"detail":[{"msg":"field required"}]}"#);
        assert!(matches!(err, DashboardError::Api { status: 422, .. }));
    }

    #[test]
    fn test_data_query_omits_unset_params() {
        assert!(DataQuery::default().to_pairs().is_empty());

        let query = DataQuery {
            interval: Some("1d".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: None,
        };
        assert_eq!(
            query.to_pairs(),
            vec![("interval", "1d".to_string()), ("start_date", "2024-01-01".to_string())]
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = ApiClient::new("http://localhost:8000/api", Duration::from_secs(1)).unwrap();
        let url = client.endpoint(&["stock", "BB/RI"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/stock/BB%2FRI");
    }

    #[tokio::test]
    async fn test_search_stocks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stocks/search"))
            .and(query_param("q", "bbca"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"symbol": "BBCA", "name": "Bank Central Asia Tbk."}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let results = client.search_stocks(" bbca ").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "BBCA");
    }

    #[tokio::test]
    async fn test_empty_search_is_rejected_locally() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        let err = client.search_stocks("   ").await.unwrap_err();
        assert!(matches!(err, DashboardError::InvalidParameter(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_technical_analysis_uppercases_symbol_and_passes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/analysis/technical/TLKM"))
            .and(query_param("interval", "1h"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "symbol": "TLKM",
                "summary": {"price": 3900.0, "rsi": 48.2, "macd": null,
                            "macd_signal": null, "sma_20": 3850.5, "sma_50": null},
                "data": [
                    {"timestamp": "2024-01-02T00:00:00", "open": 3880, "high": 3920,
                     "low": 3870, "close": 3900, "volume": 1200000, "sma_20": 3850.5}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let analysis = client
            .technical_analysis("tlkm", &DataQuery::with_interval("1h"))
            .await
            .unwrap();

        assert_eq!(analysis.symbol, "TLKM");
        assert_eq!(analysis.summary.rsi, Some(48.2));
        assert_eq!(analysis.summary.macd, None);
        assert_eq!(analysis.data.len(), 1);
    }

    #[tokio::test]
    async fn test_non_success_surfaces_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stock/XXXX"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"detail": "No data found for symbol"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.stock_data("xxxx", &DataQuery::default()).await.unwrap_err();
        assert_eq!(err.user_message(), "No data found for symbol");
    }

    #[tokio::test]
    async fn test_unparseable_error_body_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.health().await.unwrap_err();
        assert_eq!(err.user_message(), "HTTP error! status: 503");
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_all_stocks_and_fundamentals() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stocks/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stocks": [{"symbol": "BBRI", "name": "Bank Rakyat Indonesia"},
                           {"symbol": "ASII", "name": null}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/analysis/fundamental/BBRI"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "symbol": "BBRI",
                "analysis": {"overall_rating": "Good"},
                "raw_data": {"pe_ratio": 12.3}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let stocks = client.all_stocks().await.unwrap();
        assert_eq!(stocks.len(), 2);
        assert_eq!(stocks[1].name, None);

        let fundamental = client.fundamental_analysis("bbri").await.unwrap();
        assert_eq!(fundamental.analysis["overall_rating"], "Good");
    }
}
