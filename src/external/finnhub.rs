use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::external::quote_provider::{NewsArticle, Quote, QuoteProvider, QuoteProviderError};

const BASE_URL: &str = "https://finnhub.io/api/v1";

pub struct FinnhubProvider {
    client: reqwest::Client,
    api_key: String,
}

impl FinnhubProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    pub fn from_env() -> Result<Self, QuoteProviderError> {
        let api_key = std::env::var("FINNHUB_API_KEY")
            .map_err(|_| QuoteProviderError::BadResponse("FINNHUB_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }
}

#[derive(Debug, Deserialize)]
struct FinnhubQuote {
    #[serde(default)]
    c: f64,
    #[serde(default)]
    o: f64,
    #[serde(default)]
    h: f64,
    #[serde(default)]
    l: f64,
    #[serde(default)]
    pc: f64,
}

#[derive(Debug, Deserialize)]
struct FinnhubNewsItem {
    #[serde(default)]
    headline: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    datetime: i64,
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    async fn quote(&self, symbol: &str) -> Result<Quote, QuoteProviderError> {
        let url = format!("{}/quote", BASE_URL);

        let resp = self
            .client
            .get(&url)
            .query(&[("symbol", symbol), ("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| QuoteProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(QuoteProviderError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(QuoteProviderError::BadResponse(format!(
                "HTTP {}",
                resp.status()
            )));
        }

        let body: FinnhubQuote = resp
            .json()
            .await
            .map_err(|e| QuoteProviderError::Parse(e.to_string()))?;

        // Unknown symbols come back as an all-zero quote rather than an error.
        if body.c == 0.0 && body.pc == 0.0 {
            return Err(QuoteProviderError::UnknownSymbol(symbol.to_string()));
        }

        Ok(Quote {
            symbol: symbol.to_string(),
            current: body.c,
            open: body.o,
            high: body.h,
            low: body.l,
            previous_close: body.pc,
        })
    }

    async fn company_news(&self, symbol: &str) -> Result<Vec<NewsArticle>, QuoteProviderError> {
        let url = format!("{}/company-news", BASE_URL);
        let to = Utc::now().date_naive();
        let from = (to - Duration::days(7)).format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("token", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| QuoteProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(QuoteProviderError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(QuoteProviderError::BadResponse(format!(
                "HTTP {}",
                resp.status()
            )));
        }

        let items: Vec<FinnhubNewsItem> = resp
            .json()
            .await
            .map_err(|e| QuoteProviderError::Parse(e.to_string()))?;

        Ok(items
            .into_iter()
            .map(|item| NewsArticle {
                headline: item.headline,
                source: item.source,
                summary: item.summary,
                url: item.url,
                published_at: item.datetime,
            })
            .collect())
    }
}
