/*
[INPUT]:  Search terms and catalog query parameters
[OUTPUT]: Service health and stock catalog data
[POS]:    HTTP layer - health and stock catalog endpoints
[UPDATE]: When adding new catalog endpoints or changing response format
*/

use crate::http::{ApiClient, Result};
use crate::types::{HealthResponse, Market, SearchResponse, StockListResponse};
use reqwest::Method;

impl ApiClient {
    /// Check service health
    ///
    /// GET /health
    pub async fn health(&self) -> Result<HealthResponse> {
        let builder = self.request(Method::GET, "/health")?;
        self.send_json(builder).await
    }

    /// Search the stock catalog by name, code, or sector
    ///
    /// GET /stocks/search?q={q}&market={market}&limit={limit}
    ///
    /// The market parameter is omitted when searching all markets.
    pub async fn search_stocks(
        &self,
        query: &str,
        market: Market,
        limit: u32,
    ) -> Result<SearchResponse> {
        let mut params: Vec<(&str, String)> =
            vec![("q", query.to_string()), ("limit", limit.to_string())];
        if let Some(market) = market.as_query_param() {
            params.push(("market", market.to_string()));
        }

        let builder = self.request(Method::GET, "/stocks/search")?.query(&params);
        self.send_json(builder).await
    }

    /// Count of supported stocks
    ///
    /// GET /stocks/list
    pub async fn list_stocks(&self) -> Result<StockListResponse> {
        let builder = self.request(Method::GET, "/stocks/list")?;
        self.send_json(builder).await
    }
}
