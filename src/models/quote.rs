use serde::{Deserialize, Serialize};

/// Envelope returned by the random-quote API.
#[derive(Debug, Deserialize)]
pub struct QuoteEnvelope {
    pub data: Quote,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Quote {
    pub content: String,
    pub author: String,
}
