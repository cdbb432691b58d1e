//! GraphQL client for the EtherFi auction subgraph.
//!
//! Every request reports its outcome to the api_health gauge: 1 after a
//! successfully parsed 2xx response, 0 after anything else.

use prometheus::IntGauge;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::models::bid::{BidRecord, ExtremumRecord};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Width of one pubKeyIndex pagination window
const PAGE_SIZE: i64 = 1000;

/// One pagination window of our bids, nested validator included.
/// Cursor bounds and the bidder address are bound as GraphQL variables.
const BIDS_PAGE_QUERY: &str = r#"
query BidsPage($bidder: String!, $start: BigInt!, $end: BigInt!, $first: Int!) {
    bids(
        where: {bidderAddress: $bidder, pubKeyIndex_gte: $start, pubKeyIndex_lt: $end}
        first: $first
    ) {
        id
        bidderAddress
        pubKeyIndex
        status
        amount
        blockNumber
        blockTimestamp
        transactionHash
        validator {
            id
            phase
            validatorPubKey
            blockNumber
            blockTimestamp
            transactionHash
        }
    }
}
"#;

/// Single cheapest and single dearest ACTIVE bid across all bidders
const ACTIVE_EXTREMA_QUERY: &str = r#"
query ActiveExtrema {
    minBid: bids(where: {status: "ACTIVE"}, orderBy: amount, orderDirection: asc, first: 1) {
        bidderAddress
        amount
    }
    maxBid: bids(where: {status: "ACTIVE"}, orderBy: amount, orderDirection: desc, first: 1) {
        bidderAddress
        amount
    }
}
"#;

type ServiceResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone)]
pub struct SubgraphService {
    client: Client,
    api_url: String,
    api_health: IntGauge,
}

impl SubgraphService {
    pub fn new(api_url: String, api_health: IntGauge) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_url,
            api_health,
        }
    }

    /// POST one GraphQL query. Exactly one health-gauge write per call.
    pub async fn execute(&self, query: &str, variables: Value) -> ServiceResult<Value> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                self.api_health.set(0);
                return Err(e.into());
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Failed API response [{}] {}", status, body);
            self.api_health.set(0);
            return Err(format!("subgraph returned HTTP {}", status).into());
        }

        match response.json::<Value>().await {
            Ok(body) => {
                self.api_health.set(1);
                Ok(body)
            }
            Err(e) => {
                self.api_health.set(0);
                Err(e.into())
            }
        }
    }

    /// Fetch every bid of the given bidder, walking pubKeyIndex windows of
    /// PAGE_SIZE until a window comes back empty or without the expected
    /// shape. The result is sorted ascending by pubKeyIndex. Transport and
    /// decode failures abort the whole fetch so the caller keeps its
    /// previously stored state.
    pub async fn fetch_all_bids(&self, bidder_address: &str) -> ServiceResult<Vec<BidRecord>> {
        let mut all_bids: Vec<BidRecord> = Vec::new();
        let mut start: i64 = 0;

        loop {
            let variables = json!({
                "bidder": bidder_address,
                "start": start.to_string(),
                "end": (start + PAGE_SIZE).to_string(),
                "first": PAGE_SIZE,
            });

            let result = self.execute(BIDS_PAGE_QUERY, variables).await?;

            let Some(page) = result.pointer("/data/bids").filter(|v| !v.is_null()) else {
                break;
            };
            let page: Vec<BidRecord> = serde_json::from_value(page.clone())?;
            if page.is_empty() {
                break;
            }

            all_bids.extend(page);
            start += PAGE_SIZE;
        }

        // Windows are disjoint integer ranges; a single sort restores the
        // global ordering across pages.
        all_bids.sort_by_key(|bid| bid.pub_key_index);
        tracing::info!("Fetched bids: {}", all_bids.len());

        Ok(all_bids)
    }

    /// Min and max ACTIVE bid across all bidders. Ok(None) when either
    /// sub-select is missing or empty, so the caller can skip the two
    /// extrema writes rather than publish a bogus zero.
    pub async fn fetch_active_extrema(
        &self,
    ) -> ServiceResult<Option<(ExtremumRecord, ExtremumRecord)>> {
        let result = self.execute(ACTIVE_EXTREMA_QUERY, json!({})).await?;

        let (Some(min), Some(max)) = (
            result.pointer("/data/minBid/0"),
            result.pointer("/data/maxBid/0"),
        ) else {
            return Ok(None);
        };

        let min: ExtremumRecord = serde_json::from_value(min.clone())?;
        let max: ExtremumRecord = serde_json::from_value(max.clone())?;

        Ok(Some((min, max)))
    }
}
