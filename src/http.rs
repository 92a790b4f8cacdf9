//! HTTP transport for the Lighter exchange API

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::transport::Transport;
use eyre::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// `code` value of a successful API response
pub const CODE_OK: i32 = 200;

// ========== API Response Types ==========

#[derive(Debug, Deserialize)]
struct ResultCode {
    code: i32,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NextNonce {
    nonce: i64,
}

/// API key slot as reported by the exchange
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiKey {
    pub account_index: i64,
    pub api_key_index: u8,
    #[serde(default)]
    pub nonce: i64,
    pub public_key: String,
}

#[derive(Debug, Deserialize)]
struct AccountApiKeys {
    #[serde(default)]
    api_keys: Vec<ApiKey>,
}

#[derive(Debug, Deserialize)]
struct TxHashResponse {
    tx_hash: String,
}

/// Check HTTP status and the `{code, message}` envelope, then decode the body
fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, TransportError> {
    if status != 200 {
        return Err(TransportError::Status {
            status,
            body: body.to_string(),
        });
    }

    let result: ResultCode = serde_json::from_str(body)?;
    if result.code != CODE_OK {
        return Err(TransportError::Api {
            code: result.code,
            message: result.message.unwrap_or_default(),
        });
    }

    Ok(serde_json::from_str(body)?)
}

/// reqwest-backed [`Transport`]
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    channel_name: String,
    price_protection: bool,
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client from configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        eyre::ensure!(!config.url.is_empty(), "API URL must not be empty");

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            channel_name: config.channel_name.clone(),
            price_protection: config.price_protection,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        account_index: i64,
        api_key_index: u8,
    ) -> Result<T, TransportError> {
        let resp = self
            .client
            .get(self.endpoint(path))
            .query(&[
                ("account_index", account_index.to_string()),
                ("api_key_index", api_key_index.to_string()),
            ])
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        parse_response(status, &body)
    }

    /// All API key slots matching the query
    pub async fn api_keys(&self, account_index: i64, api_key_index: u8) -> Result<Vec<ApiKey>> {
        let result: AccountApiKeys = self
            .get("api/v1/apikeys", account_index, api_key_index)
            .await
            .context("Failed to get api keys")?;
        Ok(result.api_keys)
    }
}

impl Transport for HttpClient {
    async fn next_nonce(&self, account_index: i64, api_key_index: u8) -> Result<i64> {
        let result: NextNonce = self
            .get("api/v1/nextNonce", account_index, api_key_index)
            .await
            .context("Failed to get next nonce")?;

        tracing::debug!(account_index, api_key_index, nonce = result.nonce, "fetched next nonce");
        Ok(result.nonce)
    }

    async fn api_key(&self, account_index: i64, api_key_index: u8) -> Result<String> {
        let keys = self.api_keys(account_index, api_key_index).await?;
        match keys.into_iter().next() {
            Some(key) => Ok(key.public_key),
            None => Err(TransportError::Other(format!(
                "no api key registered for account {} slot {}",
                account_index, api_key_index
            ))
            .into()),
        }
    }

    async fn send_tx(&self, tx_type: u8, tx_info: &str) -> Result<String> {
        let mut form = vec![
            ("tx_type", tx_type.to_string()),
            ("tx_info", tx_info.to_string()),
        ];
        if !self.price_protection {
            form.push(("price_protection", "false".to_string()));
        }

        let resp = self
            .client
            .post(self.endpoint("api/v1/sendTx"))
            .header("Channel-Name", &self.channel_name)
            .form(&form)
            .send()
            .await
            .map_err(TransportError::from)
            .context("Failed to send transaction")?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(TransportError::from)
            .context("Failed to read sendTx response")?;
        let result: TxHashResponse =
            parse_response(status, &body).context("Transaction rejected")?;

        tracing::info!("Submitted transaction type {}: {}", tx_type, result.tx_hash);
        Ok(result.tx_hash)
    }
}
