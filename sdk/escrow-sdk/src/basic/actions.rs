use crate::config::EscrowConfig;
use crate::core::contract::{ContractFactory, EscrowContract, ReceiptStatus, TransactionReceipt};
use crate::core::signer::EscrowSigner;
use crate::error::{EscrowSdkError, Result};
use crate::types::FormDraft;
use crate::utils;
use std::sync::Arc;
use tracing::{debug, info};

pub struct DeployEscrowBuilder {
    arbiter: Option<String>,
    beneficiary: Option<String>,
    amount: u128,
}

impl DeployEscrowBuilder {
    pub fn new() -> Self {
        Self {
            arbiter: None,
            beneficiary: None,
            amount: 0,
        }
    }

    /// Start from the current form input
    pub fn from_draft(draft: &FormDraft) -> Self {
        Self::new()
            .with_arbiter(draft.arbiter.clone())
            .with_beneficiary(draft.beneficiary.clone())
            .with_amount(draft.amount)
    }

    pub fn with_arbiter(mut self, arbiter: impl Into<String>) -> Self {
        self.arbiter = Some(arbiter.into());
        self
    }

    pub fn with_beneficiary(mut self, beneficiary: impl Into<String>) -> Self {
        self.beneficiary = Some(beneficiary.into());
        self
    }

    /// Amount in wei
    pub fn with_amount(mut self, amount: u128) -> Self {
        self.amount = amount;
        self
    }

    pub fn arbiter(&self) -> &str {
        self.arbiter.as_deref().unwrap_or_default()
    }

    pub fn beneficiary(&self) -> &str {
        self.beneficiary.as_deref().unwrap_or_default()
    }

    pub fn amount(&self) -> u128 {
        self.amount
    }

    /// Check both addresses. The arbiter is checked first.
    pub fn validate(&self) -> Result<()> {
        utils::check_address("arbiter", self.arbiter())?;
        utils::check_address("beneficiary", self.beneficiary())
    }

    /// Validate, then deploy through `factory`. No factory call is made when
    /// validation fails.
    pub async fn deploy(
        &self,
        factory: &dyn ContractFactory,
        signer: Arc<dyn EscrowSigner>,
    ) -> Result<Arc<dyn EscrowContract>> {
        self.validate()?;

        debug!(
            depositor = %signer.address(),
            arbiter = self.arbiter(),
            beneficiary = self.beneficiary(),
            amount = %self.amount,
            "deploying escrow"
        );
        let contract = factory
            .deploy(signer, self.arbiter(), self.beneficiary(), self.amount)
            .await
            .map_err(|e| EscrowSdkError::Contract(e.to_string()))?;

        info!(address = %contract.address(), "escrow deployed");
        Ok(contract)
    }
}

impl Default for DeployEscrowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Submit an approval signed by `signer` and wait until it is confirmed.
pub async fn approve(
    contract: &dyn EscrowContract,
    signer: Arc<dyn EscrowSigner>,
    config: &EscrowConfig,
) -> Result<TransactionReceipt> {
    let pending = contract
        .approve(signer)
        .await
        .map_err(|e| EscrowSdkError::Contract(e.to_string()))?;
    let hash = pending.hash();
    debug!(contract = %contract.address(), tx = %hash, "approval submitted");

    let wait = pending.wait(config.confirmations);
    let receipt = match config.confirmation_timeout() {
        Some(limit) => tokio::time::timeout(limit, wait)
            .await
            .map_err(|_| EscrowSdkError::Timeout(limit.as_secs()))?,
        None => wait.await,
    }
    .map_err(|e| EscrowSdkError::Contract(e.to_string()))?;

    if receipt.status == ReceiptStatus::Reverted {
        return Err(EscrowSdkError::Reverted(hash));
    }

    info!(
        contract = %contract.address(),
        tx = %hash,
        block = receipt.block_number,
        "approval confirmed"
    );
    Ok(receipt)
}

/// The approve action attached to a registry entry. Bound to the contract
/// handle and the signer that was active when the escrow was deployed.
#[derive(Clone)]
pub struct ApprovalAction {
    contract: Arc<dyn EscrowContract>,
    signer: Arc<dyn EscrowSigner>,
}

impl ApprovalAction {
    pub fn new(contract: Arc<dyn EscrowContract>, signer: Arc<dyn EscrowSigner>) -> Self {
        Self { contract, signer }
    }

    pub fn contract(&self) -> &Arc<dyn EscrowContract> {
        &self.contract
    }

    pub fn signer_address(&self) -> String {
        self.signer.address()
    }

    pub async fn run(&self, config: &EscrowConfig) -> Result<TransactionReceipt> {
        approve(self.contract.as_ref(), self.signer.clone(), config).await
    }
}

impl std::fmt::Debug for ApprovalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalAction")
            .field("contract", &self.contract.address())
            .field("signer", &self.signer.address())
            .finish()
    }
}
