//! Transport abstraction for the exchange API
//!
//! The client only needs three calls from the network: the next nonce of an
//! API key, the public key registered in a slot, and transaction submission.
//! [`HttpClient`](crate::http::HttpClient) implements them over HTTP; tests
//! plug in an in-memory transport.

use eyre::Result;

/// Network calls used by the transaction client
pub trait Transport: Send + Sync {
    /// Next unused nonce for an API key slot
    fn next_nonce(
        &self,
        account_index: i64,
        api_key_index: u8,
    ) -> impl std::future::Future<Output = Result<i64>> + Send;

    /// Hex public key registered on the exchange for an API key slot
    fn api_key(
        &self,
        account_index: i64,
        api_key_index: u8,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Submit a signed transaction, returning the exchange's transaction hash
    fn send_tx(
        &self,
        tx_type: u8,
        tx_info: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}
