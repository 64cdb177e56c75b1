#![allow(dead_code)]

use async_trait::async_trait;
use escrow_sdk::core::contract::{
    ContractEvent, ContractFactory, EscrowContract, PendingTransaction, ReceiptStatus,
    TransactionReceipt,
};
use escrow_sdk::core::provider::{ListenerId, WalletProvider};
use escrow_sdk::core::signer::EscrowSigner;
use escrow_sdk::{EscrowApp, EscrowConfig, EscrowRegistry};
use futures::channel::mpsc as fmpsc;
use futures::stream::{BoxStream, StreamExt};
use std::collections::HashMap;
use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

type BoxError = Box<dyn Error + Send + Sync>;

pub const DEPOSITOR: &str = "0xabc0000000000000000000000000000000000001";
pub const OTHER_ACCOUNT: &str = "0xabc0000000000000000000000000000000000002";
pub const ARBITER: &str = "0x1111111111111111111111111111111111111111";
pub const BENEFICIARY: &str = "0x2222222222222222222222222222222222222222";

//=============================================================================
// Wallet Provider
//=============================================================================

pub struct TestSigner {
    address: String,
}

impl EscrowSigner for TestSigner {
    fn address(&self) -> String {
        self.address.clone()
    }
}

/// In-memory stand-in for a browser wallet extension.
#[derive(Default)]
pub struct MockProvider {
    authorized: Mutex<Vec<String>>,
    /// Account the "user" picks when prompted
    selection: Mutex<Vec<String>>,
    listeners: Mutex<HashMap<u64, mpsc::UnboundedSender<Vec<String>>>>,
    next_listener: AtomicU64,
    pub reject_requests: AtomicBool,
    pub fail_accounts: AtomicBool,
    pub fail_signer: AtomicBool,
    /// Accounts delivered while the next `eth_accounts` call is in flight
    pub emit_during_lookup: Mutex<Option<Vec<String>>>,
    pub request_accounts_calls: AtomicUsize,
    pub request_permissions_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Provider whose origin already holds a grant for `accounts`
    pub fn authorized(accounts: &[&str]) -> Arc<Self> {
        let provider = Self::default();
        *provider.authorized.lock().unwrap() = to_strings(accounts);
        *provider.selection.lock().unwrap() = to_strings(accounts);
        Arc::new(provider)
    }

    /// What the user picks in the next permission prompt
    pub fn select(&self, accounts: &[&str]) {
        *self.selection.lock().unwrap() = to_strings(accounts);
    }

    /// Deliver `accountsChanged` to every listener
    pub fn emit_accounts(&self, accounts: &[&str]) {
        let accounts = to_strings(accounts);
        *self.authorized.lock().unwrap() = accounts.clone();
        for tx in self.listeners.lock().unwrap().values() {
            let _ = tx.send(accounts.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn accounts(&self) -> Result<Vec<String>, BoxError> {
        if self.fail_accounts.load(Ordering::SeqCst) {
            return Err("provider unavailable".into());
        }
        let current = self.authorized.lock().unwrap().clone();
        let pending = self.emit_during_lookup.lock().unwrap().take();
        if let Some(next) = pending {
            let refs: Vec<&str> = next.iter().map(String::as_str).collect();
            self.emit_accounts(&refs);
        }
        Ok(current)
    }

    async fn request_accounts(&self) -> Result<Vec<String>, BoxError> {
        self.request_accounts_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_requests.load(Ordering::SeqCst) {
            return Err("User rejected the request.".into());
        }
        let selected = self.selection.lock().unwrap().clone();
        let changed = *self.authorized.lock().unwrap() != selected;
        if changed {
            let refs: Vec<&str> = selected.iter().map(String::as_str).collect();
            self.emit_accounts(&refs);
        }
        Ok(selected)
    }

    async fn request_permissions(&self) -> Result<(), BoxError> {
        self.request_permissions_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_requests.load(Ordering::SeqCst) {
            return Err("User rejected the request.".into());
        }
        Ok(())
    }

    fn signer(&self, address: &str) -> Result<Arc<dyn EscrowSigner>, BoxError> {
        if self.fail_signer.load(Ordering::SeqCst) {
            return Err("signer unavailable".into());
        }
        Ok(Arc::new(TestSigner {
            address: address.to_string(),
        }))
    }

    fn add_accounts_listener(&self) -> (ListenerId, mpsc::UnboundedReceiver<Vec<String>>) {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.lock().unwrap().insert(id, tx);
        (ListenerId(id), rx)
    }

    fn remove_accounts_listener(&self, id: ListenerId) {
        self.listeners.lock().unwrap().remove(&id.0);
    }
}

//=============================================================================
// Contracts
//=============================================================================

pub struct MockPendingTx {
    hash: String,
    status: ReceiptStatus,
    hang: bool,
}

#[async_trait]
impl PendingTransaction for MockPendingTx {
    fn hash(&self) -> String {
        self.hash.clone()
    }

    async fn wait(&self, confirmations: u64) -> Result<TransactionReceipt, BoxError> {
        if self.hang {
            futures::future::pending::<()>().await;
        }
        Ok(TransactionReceipt {
            transaction_hash: self.hash.clone(),
            block_number: 100 + confirmations,
            status: self.status,
        })
    }
}

/// Escrow contract that only lets the arbiter approve.
pub struct MockContract {
    pub address: String,
    pub depositor: String,
    pub arbiter: String,
    pub beneficiary: String,
    pub amount: u128,
    subscribers: Mutex<Vec<(String, fmpsc::UnboundedSender<ContractEvent>)>>,
    pub approvals: Mutex<Vec<String>>,
    /// Emit `Approved` when a valid approval is submitted
    pub emit_on_approve: AtomicBool,
    pub reject_approve: AtomicBool,
    pub hang_confirmation: AtomicBool,
}

impl MockContract {
    pub fn emit(&self, name: &str) {
        let event = ContractEvent {
            name: name.to_string(),
            contract_address: self.address.clone(),
            block_number: 101,
        };
        for (filter, tx) in self.subscribers.lock().unwrap().iter() {
            if filter == name {
                let _ = tx.unbounded_send(event.clone());
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

#[async_trait]
impl EscrowContract for MockContract {
    fn address(&self) -> String {
        self.address.clone()
    }

    async fn approve(
        &self,
        signer: Arc<dyn EscrowSigner>,
    ) -> Result<Box<dyn PendingTransaction>, BoxError> {
        if self.reject_approve.load(Ordering::SeqCst) {
            return Err("User denied transaction signature.".into());
        }
        let from = signer.address();
        let mut approvals = self.approvals.lock().unwrap();
        approvals.push(from.clone());
        let hash = format!("0x{:064x}", approvals.len());
        drop(approvals);

        let status = if from == self.arbiter {
            ReceiptStatus::Success
        } else {
            ReceiptStatus::Reverted
        };
        if status == ReceiptStatus::Success && self.emit_on_approve.load(Ordering::SeqCst) {
            self.emit("Approved");
        }

        Ok(Box::new(MockPendingTx {
            hash,
            status,
            hang: self.hang_confirmation.load(Ordering::SeqCst),
        }))
    }

    fn events(&self, name: &str) -> Result<BoxStream<'static, ContractEvent>, BoxError> {
        let (tx, rx) = fmpsc::unbounded();
        self.subscribers.lock().unwrap().push((name.to_string(), tx));
        Ok(rx.boxed())
    }
}

#[derive(Default)]
pub struct MockFactory {
    contracts: Mutex<Vec<Arc<MockContract>>>,
    pub deploy_calls: AtomicUsize,
    pub fail_next: Mutex<Option<String>>,
    pub emit_on_approve: AtomicBool,
}

impl MockFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn contract(&self, index: usize) -> Arc<MockContract> {
        self.contracts.lock().unwrap()[index].clone()
    }

    pub fn deployed(&self) -> usize {
        self.contracts.lock().unwrap().len()
    }
}

#[async_trait]
impl ContractFactory for MockFactory {
    async fn deploy(
        &self,
        signer: Arc<dyn EscrowSigner>,
        arbiter: &str,
        beneficiary: &str,
        amount: u128,
    ) -> Result<Arc<dyn EscrowContract>, BoxError> {
        let n = self.deploy_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.fail_next.lock().unwrap().take() {
            return Err(reason.into());
        }

        let contract = Arc::new(MockContract {
            address: format!("0x{:040x}", 0xe5c0 + n),
            depositor: signer.address(),
            arbiter: arbiter.to_string(),
            beneficiary: beneficiary.to_string(),
            amount,
            subscribers: Mutex::new(Vec::new()),
            approvals: Mutex::new(Vec::new()),
            emit_on_approve: AtomicBool::new(self.emit_on_approve.load(Ordering::SeqCst)),
            reject_approve: AtomicBool::new(false),
            hang_confirmation: AtomicBool::new(false),
        });
        self.contracts.lock().unwrap().push(contract.clone());
        Ok(contract)
    }
}

//=============================================================================
// Test Context
//=============================================================================

pub struct TestContext {
    pub provider: Arc<MockProvider>,
    pub factory: Arc<MockFactory>,
}

impl TestContext {
    pub fn new(provider: Arc<MockProvider>) -> Self {
        Self {
            provider,
            factory: MockFactory::new(),
        }
    }

    pub async fn activate(&self) -> EscrowApp {
        self.activate_with(EscrowConfig::default()).await
    }

    pub async fn activate_with(&self, config: EscrowConfig) -> EscrowApp {
        EscrowApp::activate(self.provider.clone(), self.factory.clone(), config).await
    }
}

/// Context whose wallet is already connected as [`DEPOSITOR`]
pub fn setup_test_context() -> TestContext {
    TestContext::new(MockProvider::authorized(&[DEPOSITOR]))
}

/// Fill the draft with valid parties and deploy
pub async fn deploy_escrow(app: &EscrowApp, amount: u128) -> anyhow::Result<String> {
    app.set_arbiter(ARBITER);
    app.set_beneficiary(BENEFICIARY);
    app.set_amount(amount);
    app.deploy()
        .await
        .map_err(|e| anyhow::anyhow!("deploy failed: {e}"))
}

/// Wait for the registry to show `address` as approved
pub async fn wait_until_approved(registry: &EscrowRegistry, address: &str) -> bool {
    let mut changes = registry.changes();
    let waited = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if registry.is_approved(address).await {
                return;
            }
            if changes.changed().await.is_err() {
                return;
            }
        }
    })
    .await;
    waited.is_ok() && registry.is_approved(address).await
}

fn to_strings(accounts: &[&str]) -> Vec<String> {
    accounts.iter().map(|a| a.to_string()).collect()
}
