use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::errors::AppError;

/// Snapshot quote for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub current: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub previous_close: f64,
}

/// One press item about a symbol.
#[derive(Debug, Clone, Serialize)]
pub struct NewsArticle {
    pub headline: String,
    pub source: String,
    pub summary: String,
    pub url: String,
    /// Publication time as unix seconds, as the upstream reports it.
    pub published_at: i64,
}

#[derive(Debug, Error)]
pub enum QuoteProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("rate limited")]
    RateLimited,
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<Quote, QuoteProviderError>;

    async fn company_news(&self, symbol: &str) -> Result<Vec<NewsArticle>, QuoteProviderError>;
}

impl From<QuoteProviderError> for AppError {
    fn from(e: QuoteProviderError) -> Self {
        match e {
            QuoteProviderError::RateLimited => AppError::RateLimited,
            QuoteProviderError::UnknownSymbol(_) => AppError::NotFound,
            other => AppError::External(other.to_string()),
        }
    }
}
