use crate::core::signer::EscrowSigner;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// Receipt of a transaction included in a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: u64,
    pub status: ReceiptStatus,
}

/// Event log emitted by an escrow contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractEvent {
    pub name: String,
    pub contract_address: String,
    pub block_number: u64,
}

/// A submitted, not yet confirmed, transaction.
#[async_trait]
pub trait PendingTransaction: Send + Sync {
    fn hash(&self) -> String;

    /// Resolve once the transaction has `confirmations` blocks on top of it.
    async fn wait(
        &self,
        confirmations: u64,
    ) -> Result<TransactionReceipt, Box<dyn Error + Send + Sync>>;
}

/// A deployed escrow contract.
#[async_trait]
pub trait EscrowContract: Send + Sync {
    fn address(&self) -> String;

    /// Submit `approve()` signed by `signer`.
    async fn approve(
        &self,
        signer: Arc<dyn EscrowSigner>,
    ) -> Result<Box<dyn PendingTransaction>, Box<dyn Error + Send + Sync>>;

    /// Stream of the events named `name` emitted from now on.
    fn events(&self, name: &str) -> Result<BoxStream<'static, ContractEvent>, Box<dyn Error + Send + Sync>>;
}

/// Deploys new escrow contracts. The depositor is the deploying signer and
/// `amount` wei is sent along with deployment.
#[async_trait]
pub trait ContractFactory: Send + Sync {
    async fn deploy(
        &self,
        signer: Arc<dyn EscrowSigner>,
        arbiter: &str,
        beneficiary: &str,
        amount: u128,
    ) -> Result<Arc<dyn EscrowContract>, Box<dyn Error + Send + Sync>>;
}
