// Wallet balance from the Spark sidecar (optional HTTP peer)

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::instrument;

#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Balance in satoshi. Ok(None) when the peer answered without a usable amount.
    async fn balance(&self) -> anyhow::Result<Option<i64>>;
}

pub struct SparkBalanceRepo {
    client: reqwest::Client,
    endpoint: String,
}

impl SparkBalanceRepo {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(crate::version::USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/v1/balance", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl BalanceSource for SparkBalanceRepo {
    #[instrument(skip(self), fields(repo = "spark", operation = "balance"))]
    async fn balance(&self) -> anyhow::Result<Option<i64>> {
        let resp = self.client.post(&self.endpoint).send().await?;
        if !resp.status().is_success() {
            tracing::debug!(status = %resp.status(), "balance peer returned non-success");
            return Ok(None);
        }
        let body: Value = resp.json().await?;
        Ok(normalize_balance(&body))
    }
}

/// Satoshi amount from a balance body; `balance_msat` wins over `balance_sats`.
pub fn normalize_balance(body: &Value) -> Option<i64> {
    if let Some(msat) = integer_field(body, "balance_msat") {
        return Some(msat.div_euclid(1000));
    }
    integer_field(body, "balance_sats")
}

// Peers send amounts either as JSON numbers or numeric strings.
fn integer_field(body: &Value, key: &str) -> Option<i64> {
    match body.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefers_msat_over_sats() {
        let body = json!({ "balance_msat": 1_234_567, "balance_sats": 1 });
        assert_eq!(normalize_balance(&body), Some(1234));
    }

    #[test]
    fn falls_back_to_sats() {
        assert_eq!(normalize_balance(&json!({ "balance_sats": 42 })), Some(42));
    }

    #[test]
    fn accepts_numeric_strings() {
        assert_eq!(
            normalize_balance(&json!({ "balance_msat": "5000" })),
            Some(5)
        );
    }

    #[test]
    fn null_msat_falls_through_to_sats() {
        let body = json!({ "balance_msat": null, "balance_sats": 7 });
        assert_eq!(normalize_balance(&body), Some(7));
    }

    #[test]
    fn missing_or_invalid_is_none() {
        assert_eq!(normalize_balance(&json!({})), None);
        assert_eq!(normalize_balance(&json!({ "balance_sats": "lots" })), None);
        assert_eq!(normalize_balance(&json!([1, 2])), None);
    }

    #[tokio::test]
    async fn unreachable_peer_is_an_error_not_a_panic() {
        let repo = SparkBalanceRepo::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        assert!(repo.balance().await.is_err());
    }
}
