//! TxClient - main entry point for the SDK

use crate::config::ClientConfig;
use crate::constants::{
    AUTH_TOKEN_DOMAIN_TAG, DEFAULT_AUTH_TOKEN_EXPIRY, DEFAULT_ORDER_EXPIRY, DEFAULT_TX_EXPIRY,
    NIL_CLIENT_ORDER_INDEX, NIL_EXPIRY,
};
use crate::error::{IdentityError, ValidationError};
use crate::field::FieldSequence;
use crate::hasher::{MessageHasher, Poseidon2Hasher};
use crate::http::HttpClient;
use crate::signer::{L1Signer, P256KeyManager, PublicKey, SigningIdentity};
use crate::transport::Transport;
use crate::txtypes::{
    check_account_index, check_api_key_index, sign_transaction, BurnSharesTx, CancelAllOrdersTx, CancelOrderTx, ChangePubKeyTx,
    CreateGroupedOrdersTx, CreateOrderTx, CreatePublicPoolTx, CreateSubAccountTx, MintSharesTx,
    ModifyOrderTx, SignedTransaction, Transaction, TransferTx, UpdateLeverageTx, UpdateMarginTx,
    UpdatePublicPoolTx, WithdrawTx,
};
use crate::types::{
    BurnSharesReq, CancelAllOrdersReq, CancelOrderReq, ChangePubKeyReq, CreateGroupedOrdersReq,
    CreateOrderReq, CreatePublicPoolReq, MintSharesReq, ModifyOrderReq, TransactOpts,
    TransferReq, UpdateLeverageReq, UpdateMarginReq, UpdatePublicPoolReq, WithdrawReq,
};
use eyre::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Fields shared by every transaction, resolved for one signing call
struct Header<'a> {
    identity: &'a SigningIdentity,
    account_index: i64,
    api_key_index: u8,
    nonce: i64,
    expired_at: i64,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn default_order_expiry() -> i64 {
    now_millis() + DEFAULT_ORDER_EXPIRY.as_millis() as i64
}

/// Main client for building, signing and submitting Lighter transactions
///
/// Holds one [`SigningIdentity`] per API key slot and an active slot used
/// when a call does not name one. Identity management takes `&mut self`;
/// callers sharing a client across tasks serialize access themselves.
pub struct TxClient<T: Transport> {
    config: ClientConfig,
    transport: T,
    hasher: Arc<dyn MessageHasher>,
    identities: HashMap<u8, SigningIdentity>,
    active: Option<u8>,
}

impl TxClient<HttpClient> {
    /// Create a client talking to the exchange over HTTP
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let transport = HttpClient::new(&config)?;
        Ok(Self::new(config, transport))
    }
}

impl<T: Transport> TxClient<T> {
    /// Create a client over any transport with the Poseidon2 hasher
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            hasher: Arc::new(Poseidon2Hasher::new()),
            identities: HashMap::new(),
            active: None,
        }
    }

    /// Replace the message hasher
    pub fn with_hasher(mut self, hasher: Arc<dyn MessageHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn chain_id(&self) -> u32 {
        self.config.chain_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ========== Identities ==========

    /// Register a hex private key for an API key slot and make it active
    ///
    /// Registering the same slot again replaces its identity.
    pub fn register_api_key(
        &mut self,
        private_key: &str,
        api_key_index: u8,
        account_index: i64,
    ) -> Result<PublicKey> {
        let key_manager =
            P256KeyManager::from_private_key(private_key).context("Failed to load API private key")?;
        let identity = SigningIdentity::new(Box::new(key_manager), api_key_index, account_index);
        let public_key = identity.public_key();
        self.register_identity(identity)?;
        Ok(public_key)
    }

    /// Register an identity backed by any key manager and make it active
    ///
    /// An out-of-range slot or account is rejected and leaves the registered
    /// identities and the active slot untouched.
    pub fn register_identity(&mut self, identity: SigningIdentity) -> Result<(), ValidationError> {
        check_api_key_index(identity.api_key_index())?;
        check_account_index(identity.account_index())?;

        let api_key_index = identity.api_key_index();
        tracing::info!(
            api_key_index,
            account_index = identity.account_index(),
            "registered signing identity"
        );
        self.identities.insert(api_key_index, identity);
        self.active = Some(api_key_index);
        Ok(())
    }

    /// Make a registered API key slot the active one
    ///
    /// Fails without touching the active slot when `api_key_index` is unknown.
    pub fn switch_api_key(&mut self, api_key_index: u8) -> Result<(), IdentityError> {
        if !self.identities.contains_key(&api_key_index) {
            return Err(IdentityError::NotRegistered(api_key_index));
        }
        self.active = Some(api_key_index);
        tracing::debug!(api_key_index, "switched active api key");
        Ok(())
    }

    /// Slot of the active identity
    pub fn active_api_key_index(&self) -> Option<u8> {
        self.active
    }

    /// Identity registered for a slot, or the active one when `None`
    pub fn identity(&self, api_key_index: Option<u8>) -> Result<&SigningIdentity, IdentityError> {
        let index = match api_key_index {
            Some(index) => index,
            None => self.active.ok_or(IdentityError::NoActiveIdentity)?,
        };
        self.identities
            .get(&index)
            .ok_or(IdentityError::NotRegistered(index))
    }

    /// Check a registered identity against the exchange
    ///
    /// The slot must be registered locally for `account_index`, and the public
    /// key the exchange holds for it must equal the local one.
    pub async fn check_client(&self, api_key_index: u8, account_index: i64) -> Result<()> {
        let identity = self.identity(Some(api_key_index))?;
        if identity.account_index() != account_index {
            return Err(IdentityError::AccountIndexMismatch {
                expected: identity.account_index(),
                actual: account_index,
            }
            .into());
        }

        let registered = self
            .transport
            .api_key(account_index, api_key_index)
            .await
            .context("Failed to get api keys")?;
        let own = identity.public_key();
        let matches = PublicKey::from_hex(&registered)
            .map(|key| key == own)
            .unwrap_or(false);
        if !matches {
            return Err(IdentityError::PublicKeyMismatch {
                own: own.to_hex(),
                registered,
            }
            .into());
        }
        Ok(())
    }

    // ========== Auth ==========

    /// Create an auth token for the exchange's authenticated endpoints
    ///
    /// `deadline` is a Unix timestamp in seconds; 0 means now + 7 hours. The
    /// token is `"{deadline}:{account}:{api_key}:{hex signature}"`.
    pub fn create_auth_token(&self, deadline: i64, api_key_index: Option<u8>) -> Result<String> {
        let identity = self.identity(api_key_index)?;
        let deadline = if deadline == 0 {
            chrono::Utc::now().timestamp() + DEFAULT_AUTH_TOKEN_EXPIRY.as_secs() as i64
        } else {
            deadline
        };
        eyre::ensure!(
            deadline > chrono::Utc::now().timestamp(),
            "auth token deadline {} is in the past",
            deadline
        );

        let message = format!(
            "{}:{}:{}",
            deadline,
            identity.account_index(),
            identity.api_key_index()
        );
        let mut seq = FieldSequence::new(self.config.chain_id, AUTH_TOKEN_DOMAIN_TAG);
        seq.push_bytes(message.as_bytes());
        let digest = self.hasher.hash(&seq);
        let sig = identity
            .key_manager()
            .sign(&digest)
            .context("Failed to sign auth token")?;

        Ok(format!("{}:{}", message, sig.to_hex()))
    }

    // ========== Signing ==========

    async fn resolve(&self, opts: &TransactOpts) -> Result<Header<'_>> {
        let identity = self.identity(opts.api_key_index)?;
        let account_index = opts
            .from_account_index
            .unwrap_or_else(|| identity.account_index());
        let api_key_index = identity.api_key_index();

        let nonce = match opts.nonce {
            Some(nonce) => nonce,
            None => self
                .transport
                .next_nonce(account_index, api_key_index)
                .await
                .context("Failed to resolve nonce")?,
        };
        let expired_at = opts
            .expired_at
            .unwrap_or_else(|| now_millis() + DEFAULT_TX_EXPIRY.as_millis() as i64);

        Ok(Header {
            identity,
            account_index,
            api_key_index,
            nonce,
            expired_at,
        })
    }

    fn finish(&self, identity: &SigningIdentity, tx: Transaction) -> Result<SignedTransaction> {
        sign_transaction(tx, self.config.chain_id, self.hasher.as_ref(), identity.key_manager())
    }

    /// Validate, hash and sign a fully built transaction with a registered identity
    pub fn sign(&self, tx: impl Into<Transaction>, api_key_index: Option<u8>) -> Result<SignedTransaction> {
        let identity = self.identity(api_key_index)?;
        self.finish(identity, tx.into())
    }

    /// Register a new public key in the signing slot
    ///
    /// The result carries `MessageToSign`; attach an L1 signature with
    /// [`attach_l1_signature`] before sending.
    pub async fn sign_change_pub_key(
        &self,
        req: ChangePubKeyReq,
        opts: TransactOpts,
    ) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let tx = ChangePubKeyTx {
            account_index: h.account_index,
            api_key_index: h.api_key_index,
            pub_key: req.pub_key,
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    pub async fn sign_create_sub_account(&self, opts: TransactOpts) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let tx = CreateSubAccountTx {
            account_index: h.account_index,
            api_key_index: h.api_key_index,
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    pub async fn sign_create_public_pool(
        &self,
        req: CreatePublicPoolReq,
        opts: TransactOpts,
    ) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let tx = CreatePublicPoolTx {
            account_index: h.account_index,
            api_key_index: h.api_key_index,
            operator_fee: req.operator_fee,
            initial_total_shares: req.initial_total_shares,
            min_operator_share_rate: req.min_operator_share_rate,
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    pub async fn sign_update_public_pool(
        &self,
        req: UpdatePublicPoolReq,
        opts: TransactOpts,
    ) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let tx = UpdatePublicPoolTx {
            account_index: h.account_index,
            api_key_index: h.api_key_index,
            public_pool_index: req.public_pool_index,
            status: req.status,
            operator_fee: req.operator_fee,
            min_operator_share_rate: req.min_operator_share_rate,
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    /// Transfer USDC; the result carries `MessageToSign` for the L1 signature
    pub async fn sign_transfer(&self, req: TransferReq, opts: TransactOpts) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let tx = TransferTx {
            from_account_index: h.account_index,
            api_key_index: h.api_key_index,
            to_account_index: req.to_account_index,
            usdc_amount: req.usdc_amount,
            fee: req.fee,
            memo: req.memo,
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    pub async fn sign_withdraw(&self, req: WithdrawReq, opts: TransactOpts) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let tx = WithdrawTx {
            from_account_index: h.account_index,
            api_key_index: h.api_key_index,
            usdc_amount: req.usdc_amount,
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    /// Place an order; an order expiry of -1 becomes now + 28 days
    pub async fn sign_create_order(
        &self,
        req: &CreateOrderReq,
        opts: TransactOpts,
    ) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let order_expiry = match req.order_expiry {
            NIL_EXPIRY => default_order_expiry(),
            expiry => expiry,
        };
        let tx = CreateOrderTx {
            account_index: h.account_index,
            api_key_index: h.api_key_index,
            order: req.to_order_info(order_expiry),
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    /// Place linked orders; leg client order indices are cleared
    pub async fn sign_create_grouped_orders(
        &self,
        req: &CreateGroupedOrdersReq,
        opts: TransactOpts,
    ) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let orders = req
            .orders
            .iter()
            .map(|leg| {
                let order_expiry = match leg.order_expiry {
                    NIL_EXPIRY => default_order_expiry(),
                    expiry => expiry,
                };
                let mut info = leg.to_order_info(order_expiry);
                info.client_order_index = NIL_CLIENT_ORDER_INDEX;
                info
            })
            .collect();
        let tx = CreateGroupedOrdersTx {
            account_index: h.account_index,
            api_key_index: h.api_key_index,
            grouping_type: req.grouping_type,
            orders,
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    pub async fn sign_cancel_order(
        &self,
        req: CancelOrderReq,
        opts: TransactOpts,
    ) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let tx = CancelOrderTx {
            account_index: h.account_index,
            api_key_index: h.api_key_index,
            market_index: req.market_index,
            index: req.index,
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    pub async fn sign_cancel_all_orders(
        &self,
        req: CancelAllOrdersReq,
        opts: TransactOpts,
    ) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let tx = CancelAllOrdersTx {
            account_index: h.account_index,
            api_key_index: h.api_key_index,
            time_in_force: req.time_in_force,
            time: req.time,
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    pub async fn sign_modify_order(
        &self,
        req: ModifyOrderReq,
        opts: TransactOpts,
    ) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let tx = ModifyOrderTx {
            account_index: h.account_index,
            api_key_index: h.api_key_index,
            market_index: req.market_index,
            index: req.index,
            base_amount: req.base_amount,
            price: req.price,
            trigger_price: req.trigger_price,
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    pub async fn sign_mint_shares(&self, req: MintSharesReq, opts: TransactOpts) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let tx = MintSharesTx {
            account_index: h.account_index,
            api_key_index: h.api_key_index,
            public_pool_index: req.public_pool_index,
            share_amount: req.share_amount,
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    pub async fn sign_burn_shares(&self, req: BurnSharesReq, opts: TransactOpts) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let tx = BurnSharesTx {
            account_index: h.account_index,
            api_key_index: h.api_key_index,
            public_pool_index: req.public_pool_index,
            share_amount: req.share_amount,
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    pub async fn sign_update_leverage(
        &self,
        req: UpdateLeverageReq,
        opts: TransactOpts,
    ) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let tx = UpdateLeverageTx {
            account_index: h.account_index,
            api_key_index: h.api_key_index,
            market_index: req.market_index,
            initial_margin_fraction: req.initial_margin_fraction,
            margin_mode: req.margin_mode,
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    pub async fn sign_update_margin(
        &self,
        req: UpdateMarginReq,
        opts: TransactOpts,
    ) -> Result<SignedTransaction> {
        let h = self.resolve(&opts).await?;
        let tx = UpdateMarginTx {
            account_index: h.account_index,
            api_key_index: h.api_key_index,
            market_index: req.market_index,
            usdc_amount: req.usdc_amount,
            direction: req.direction,
            expired_at: h.expired_at,
            nonce: h.nonce,
        };
        self.finish(h.identity, tx.into())
    }

    // ========== Submission ==========

    /// Submit a signed transaction, returning the exchange's transaction hash
    pub async fn send(&self, signed: &SignedTransaction) -> Result<String> {
        if signed.message_to_sign().is_some() && signed.l1_signature().is_none() {
            tracing::warn!(
                tx_type = signed.tx_type(),
                "sending transaction without the L1 signature it requires"
            );
        }
        let tx_info = signed.tx_info()?;
        self.transport.send_tx(signed.tx_type(), &tx_info).await
    }
}

/// Sign `MessageToSign` with an L1 key and attach the result as `L1Sig`
pub fn attach_l1_signature(signed: SignedTransaction, l1: &L1Signer) -> Result<SignedTransaction> {
    let Some(message) = signed.message_to_sign() else {
        eyre::bail!("transaction type {} has no L1 message to sign", signed.tx_type());
    };
    let l1_sig = l1.sign_message(message).context("Failed to sign L1 message")?;
    Ok(signed.with_l1_signature(l1_sig))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        GROUPING_ONE_CANCELS_THE_OTHER, MARGIN_MODE_CROSS, TX_TYPE_CHANGE_PUB_KEY,
        TX_TYPE_CREATE_ORDER, TX_TYPE_TRANSFER, TX_TYPE_UPDATE_MARGIN,
    };
    use crate::signer::{generate_api_key, verify_signature, KeyManager};
    use crate::txtypes::tests::TEST_KEY;
    use crate::txtypes::TxInfo;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const OTHER_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const EXPIRY: i64 = 1_700_000_000_000;

    #[derive(Default)]
    struct MockTransport {
        nonce: i64,
        registered_key: String,
        nonce_calls: AtomicUsize,
        sent: Mutex<Vec<(u8, String)>>,
    }

    impl Transport for MockTransport {
        async fn next_nonce(&self, _account_index: i64, _api_key_index: u8) -> Result<i64> {
            self.nonce_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.nonce)
        }

        async fn api_key(&self, _account_index: i64, _api_key_index: u8) -> Result<String> {
            Ok(self.registered_key.clone())
        }

        async fn send_tx(&self, tx_type: u8, tx_info: &str) -> Result<String> {
            if let Ok(mut sent) = self.sent.lock() {
                sent.push((tx_type, tx_info.to_string()));
            }
            Ok("0xhash".to_string())
        }
    }

    fn client_with(transport: MockTransport) -> TxClient<MockTransport> {
        let mut client = TxClient::new(ClientConfig::default(), transport);
        client.register_api_key(TEST_KEY, 3, 42).unwrap();
        client
    }

    fn client() -> TxClient<MockTransport> {
        client_with(MockTransport {
            nonce: 11,
            ..Default::default()
        })
    }

    fn pinned() -> TransactOpts {
        TransactOpts::new().with_nonce(5).with_expired_at(EXPIRY)
    }

    #[tokio::test]
    async fn test_nonce_fetched_once_when_unset() {
        let client = client();
        let signed = client
            .sign_update_margin(
                UpdateMarginReq { market_index: 1, usdc_amount: 100, direction: 0 },
                TransactOpts::new().with_expired_at(EXPIRY),
            )
            .await
            .unwrap();

        assert_eq!(client.transport().nonce_calls.load(Ordering::SeqCst), 1);
        match signed.tx() {
            Transaction::UpdateMargin(tx) => assert_eq!(tx.nonce, 11),
            other => panic!("unexpected transaction {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_explicit_nonce_skips_network() {
        let client = client();
        client
            .sign_create_sub_account(pinned())
            .await
            .unwrap();
        assert_eq!(client.transport().nonce_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_nonce_is_used_verbatim() {
        let client = client();
        let signed = tokio_test::block_on(
            client.sign_withdraw(WithdrawReq::new(2.0), TransactOpts::from_sentinels(0, EXPIRY)),
        )
        .unwrap();
        match signed.tx() {
            Transaction::Withdraw(tx) => {
                assert_eq!(tx.nonce, 0);
                assert_eq!(tx.usdc_amount, 2_000_000);
            }
            other => panic!("unexpected transaction {other:?}"),
        }
        assert_eq!(client.transport().nonce_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_default_expiry_is_ten_minutes() {
        let client = client();
        let before = now_millis();
        let signed = client
            .sign_create_sub_account(TransactOpts::new().with_nonce(0))
            .await
            .unwrap();
        let expired_at = match signed.tx() {
            Transaction::CreateSubAccount(tx) => tx.expired_at,
            other => panic!("unexpected transaction {other:?}"),
        };
        let horizon = DEFAULT_TX_EXPIRY.as_millis() as i64;
        assert!(expired_at >= before + horizon);
        assert!(expired_at <= now_millis() + horizon);
    }

    #[tokio::test]
    async fn test_signature_verifies_against_identity() {
        let client = client();
        let signed = client
            .sign_cancel_order(CancelOrderReq { market_index: 0, index: 9 }, pinned())
            .await
            .unwrap();
        let pk = client.identity(None).unwrap().public_key();
        verify_signature(&pk, signed.signed_hash(), signed.signature()).unwrap();
    }

    #[tokio::test]
    async fn test_validation_error_surfaces() {
        let client = client();
        let err = client
            .sign_update_margin(
                UpdateMarginReq { market_index: 1, usdc_amount: 0, direction: 0 },
                pinned(),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::USDCAmountIsZero)
        );
    }

    #[tokio::test]
    async fn test_create_order_resolves_order_expiry() {
        let client = client();
        let before = now_millis();
        let signed = client
            .sign_create_order(&CreateOrderReq::limit(0, 100, 3_000, false), pinned())
            .await
            .unwrap();
        assert_eq!(signed.tx_type(), TX_TYPE_CREATE_ORDER);
        match signed.tx() {
            Transaction::CreateOrder(tx) => {
                assert!(tx.order.order_expiry >= before + DEFAULT_ORDER_EXPIRY.as_millis() as i64);
                assert_eq!(tx.account_index, 42);
                assert_eq!(tx.api_key_index, 3);
            }
            other => panic!("unexpected transaction {other:?}"),
        }

        let market = client
            .sign_create_order(&CreateOrderReq::market(0, 100, 3_000, true), pinned())
            .await
            .unwrap();
        match market.tx() {
            Transaction::CreateOrder(tx) => assert_eq!(tx.order.order_expiry, 0),
            other => panic!("unexpected transaction {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_grouped_orders_clear_client_index() {
        let client = client();
        let req = CreateGroupedOrdersReq::one_cancels_the_other(
            CreateOrderReq::stop_loss(0, 10, 2_900, 2_850, true).with_client_order_index(77),
            CreateOrderReq::take_profit(0, 10, 3_100, 3_050, true),
        );
        assert_eq!(req.grouping_type, GROUPING_ONE_CANCELS_THE_OTHER);
        let signed = client.sign_create_grouped_orders(&req, pinned()).await.unwrap();
        match signed.tx() {
            Transaction::CreateGroupedOrders(tx) => {
                assert!(tx.orders.iter().all(|o| o.client_order_index == NIL_CLIENT_ORDER_INDEX));
            }
            other => panic!("unexpected transaction {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_switch_api_key() {
        let mut client = client();
        client.register_api_key(OTHER_KEY, 4, 42).unwrap();
        assert_eq!(client.active_api_key_index(), Some(4));

        client.switch_api_key(3).unwrap();
        assert_eq!(client.active_api_key_index(), Some(3));

        let err = client.switch_api_key(9).unwrap_err();
        assert_eq!(err, IdentityError::NotRegistered(9));
        assert_eq!(client.active_api_key_index(), Some(3));

        let signed = client
            .sign_update_leverage(
                UpdateLeverageReq { market_index: 0, initial_margin_fraction: 1_000, margin_mode: MARGIN_MODE_CROSS },
                pinned().with_api_key_index(4),
            )
            .await
            .unwrap();
        match signed.tx() {
            Transaction::UpdateLeverage(tx) => assert_eq!(tx.api_key_index, 4),
            other => panic!("unexpected transaction {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_identity_is_rejected() {
        let mut client = client();

        let err = client.register_api_key(OTHER_KEY, 255, 42).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::ApiKeyIndexTooHigh)
        );

        let err = client.register_api_key(OTHER_KEY, 4, 1 << 50).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::FromAccountIndexTooHigh)
        );

        let err = client.register_api_key(OTHER_KEY, 4, 0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::FromAccountIndexTooLow)
        );

        assert_eq!(client.active_api_key_index(), Some(3));
        assert!(client.identity(Some(255)).is_err());
        assert!(client.identity(Some(4)).is_err());
    }

    #[tokio::test]
    async fn test_unregistered_identity_fails_before_network() {
        let client = TxClient::new(ClientConfig::default(), MockTransport::default());
        let err = client
            .sign_create_sub_account(TransactOpts::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<IdentityError>(),
            Some(&IdentityError::NoActiveIdentity)
        );
        assert_eq!(client.transport().nonce_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_from_account_index_override() {
        let client = client();
        let signed = client
            .sign_transfer(TransferReq::new(100, 1.0), pinned().with_from_account_index(55))
            .await
            .unwrap();
        assert_eq!(signed.tx_type(), TX_TYPE_TRANSFER);
        match signed.tx() {
            Transaction::Transfer(tx) => assert_eq!(tx.from_account_index, 55),
            other => panic!("unexpected transaction {other:?}"),
        }
        assert!(signed.message_to_sign().is_some());
    }

    #[tokio::test]
    async fn test_check_client() {
        let own = P256KeyManager::from_private_key(TEST_KEY).unwrap().public_key();
        let client = client_with(MockTransport {
            registered_key: own.to_hex(),
            ..Default::default()
        });
        client.check_client(3, 42).await.unwrap();

        let err = client.check_client(3, 43).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IdentityError>(),
            Some(IdentityError::AccountIndexMismatch { expected: 42, actual: 43 })
        ));

        let err = client.check_client(8, 42).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<IdentityError>(),
            Some(&IdentityError::NotRegistered(8))
        );
    }

    #[tokio::test]
    async fn test_check_client_detects_key_mismatch() {
        let other = generate_api_key(Some("other")).unwrap();
        let client = client_with(MockTransport {
            registered_key: other.public_key,
            ..Default::default()
        });
        let err = client.check_client(3, 42).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IdentityError>(),
            Some(IdentityError::PublicKeyMismatch { .. })
        ));
    }

    #[test]
    fn test_auth_token_format() {
        let client = client();
        let token = client.create_auth_token(4_000_000_000, None).unwrap();
        let parts: Vec<&str> = token.split(':').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "4000000000");
        assert_eq!(parts[1], "42");
        assert_eq!(parts[2], "3");
        assert!(hex::decode(parts[3]).is_ok());

        assert_eq!(token, client.create_auth_token(4_000_000_000, None).unwrap());
    }

    #[test]
    fn test_auth_token_rejects_past_deadline() {
        let client = client();
        let past = chrono::Utc::now().timestamp() - 60;
        assert!(client.create_auth_token(past, None).is_err());
        assert!(client.create_auth_token(-5, None).is_err());
    }

    #[test]
    fn test_auth_token_default_deadline() {
        let client = client();
        let before = chrono::Utc::now().timestamp();
        let token = client.create_auth_token(0, None).unwrap();
        let deadline: i64 = token.split(':').next().unwrap().parse().unwrap();
        assert!(deadline >= before + DEFAULT_AUTH_TOKEN_EXPIRY.as_secs() as i64);
    }

    #[tokio::test]
    async fn test_change_pub_key_with_l1_signature() {
        let client = client();
        let new_key = generate_api_key(Some("rotate")).unwrap();
        let req = ChangePubKeyReq {
            pub_key: PublicKey::from_hex(&new_key.public_key).unwrap(),
        };
        let signed = client.sign_change_pub_key(req, pinned()).await.unwrap();
        assert_eq!(signed.tx_type(), TX_TYPE_CHANGE_PUB_KEY);

        let l1 = L1Signer::from_private_key(OTHER_KEY).unwrap();
        let signed = attach_l1_signature(signed, &l1).unwrap();
        let json: serde_json::Value = serde_json::from_str(&signed.tx_info().unwrap()).unwrap();
        assert!(json["L1Sig"].as_str().unwrap().starts_with("0x"));
    }

    #[tokio::test]
    async fn test_attach_l1_signature_requires_message() {
        let client = client();
        let signed = client.sign_create_sub_account(pinned()).await.unwrap();
        let l1 = L1Signer::from_private_key(OTHER_KEY).unwrap();
        assert!(attach_l1_signature(signed, &l1).is_err());
    }

    #[tokio::test]
    async fn test_send_posts_tx_info() {
        let client = client();
        let signed = client
            .sign_update_margin(
                UpdateMarginReq { market_index: 1, usdc_amount: -20, direction: 1 },
                pinned(),
            )
            .await
            .unwrap();
        let hash = client.send(&signed).await.unwrap();
        assert_eq!(hash, "0xhash");

        let sent = client.transport().sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, TX_TYPE_UPDATE_MARGIN);
        assert_eq!(sent[0].1, signed.tx_info().unwrap());
        assert_eq!(signed.tx().tx_type(), TX_TYPE_UPDATE_MARGIN);
    }

    #[test]
    fn test_sign_prebuilt_transaction() {
        let client = client();
        let tx = crate::txtypes::tests::margin_tx(50);
        let signed = client.sign(tx, Some(3)).unwrap();
        assert_eq!(signed.tx_type(), TX_TYPE_UPDATE_MARGIN);
        assert!(client.sign(crate::txtypes::tests::margin_tx(50), Some(200)).is_err());
    }
}
