use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, FetchReason};
use crate::services::price_source::PriceSource;

const QUOTE_URL: &str = "https://finnhub.io/api/v1/quote";

#[derive(Clone)]
pub struct FinnhubClient {
    http: Client,
    api_key: String,
}

impl FinnhubClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
        }
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub async fn quote(&self, symbol: &str) -> Result<QuoteResponse, FetchReason> {
        let res = self
            .http
            .get(QUOTE_URL)
            .query(&[("symbol", symbol), ("token", &self.api_key)])
            .send()
            .await
            .map_err(|e| FetchReason::Request(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(FetchReason::Status { status, body });
        }

        res.json::<QuoteResponse>()
            .await
            .map_err(|e| FetchReason::Parse(e.to_string()))
    }

    async fn quote_price(&self, symbol: &str) -> Result<Decimal, FetchReason> {
        let quote = self.quote(symbol).await?;

        // Finnhub reports 0.0 for unknown symbols instead of an error.
        if !quote.c.is_finite() || quote.c <= 0.0 {
            return Err(FetchReason::InvalidQuote(quote.c));
        }

        Decimal::try_from(quote.c).map_err(|_| FetchReason::InvalidQuote(quote.c))
    }
}

#[async_trait]
impl PriceSource for FinnhubClient {
    async fn fetch(
        &self,
        symbols: &BTreeSet<String>,
    ) -> HashMap<String, Result<Decimal, FetchError>> {
        if !self.has_key() {
            return symbols
                .iter()
                .map(|s| {
                    let err = FetchError {
                        symbol: s.clone(),
                        reason: FetchReason::MissingApiKey,
                    };
                    (s.clone(), Err(err))
                })
                .collect();
        }

        // One upstream request per distinct symbol, all in flight together.
        let quotes = symbols.iter().map(|s| async move {
            let res = self.quote_price(s).await.map_err(|reason| FetchError {
                symbol: s.clone(),
                reason,
            });
            (s.clone(), res)
        });

        futures_util::future::join_all(quotes).await.into_iter().collect()
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuoteResponse {
    // current
    pub c: f64,
    // change
    pub d: f64,
    // percent change
    pub dp: f64,
    // high
    pub h: f64,
    // low
    pub l: f64,
    // open
    pub o: f64,
    // previous close
    pub pc: f64,
    // timestamp
    pub t: i64,
}
