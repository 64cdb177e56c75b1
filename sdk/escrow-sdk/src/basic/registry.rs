use crate::error::{EscrowSdkError, Result};
use crate::types::{EscrowRecord, EscrowStatus, EscrowView};
use crate::utils;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::debug;

/// A registered escrow together with its display status
#[derive(Debug, Clone)]
pub struct EscrowEntry {
    pub record: EscrowRecord,
    pub status: EscrowStatus,
}

impl EscrowEntry {
    pub fn is_approved(&self) -> bool {
        self.status == EscrowStatus::Approved
    }

    pub fn to_view(&self) -> EscrowView {
        EscrowView {
            address: self.record.contract_address.clone(),
            arbiter: self.record.arbiter.clone(),
            beneficiary: self.record.beneficiary.clone(),
            amount_wei: self.record.amount.to_string(),
            amount_ether: utils::format_ether(self.record.amount),
            approved: self.is_approved(),
        }
    }
}

/// Append-only, ordered list of escrows created this session.
///
/// Cloning yields another handle to the same list. Every mutation bumps a
/// revision counter observable through [`EscrowRegistry::changes`].
#[derive(Clone)]
pub struct EscrowRegistry {
    entries: Arc<RwLock<Vec<EscrowEntry>>>,
    revision: Arc<watch::Sender<u64>>,
}

impl EscrowRegistry {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            revision: Arc::new(revision),
        }
    }

    /// Append a record in `Pending` state, returning its position.
    /// Contract addresses are the entry identity and must be unique.
    pub async fn push(&self, record: EscrowRecord) -> Result<usize> {
        let mut entries = self.entries.write().await;
        if entries
            .iter()
            .any(|e| e.record.contract_address == record.contract_address)
        {
            return Err(EscrowSdkError::Other(format!(
                "escrow {} already registered",
                record.contract_address
            )));
        }

        debug!(address = %record.contract_address, "escrow registered");
        entries.push(EscrowEntry {
            record,
            status: EscrowStatus::Pending,
        });
        let index = entries.len() - 1;
        drop(entries);

        self.bump();
        Ok(index)
    }

    /// Flip an entry to `Approved`. Returns `true` only on the transition;
    /// an already approved entry stays approved.
    pub async fn mark_approved(&self, contract_address: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .iter_mut()
            .find(|e| e.record.contract_address == contract_address)
            .ok_or_else(|| EscrowSdkError::EscrowNotFound(contract_address.to_string()))?;

        if entry.is_approved() {
            return Ok(false);
        }
        entry.status = EscrowStatus::Approved;
        drop(entries);

        debug!(address = contract_address, "escrow approved");
        self.bump();
        Ok(true)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn get(&self, contract_address: &str) -> Option<EscrowEntry> {
        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.record.contract_address == contract_address)
            .cloned()
    }

    pub async fn status(&self, contract_address: &str) -> Option<EscrowStatus> {
        self.get(contract_address).await.map(|e| e.status)
    }

    pub async fn is_approved(&self, contract_address: &str) -> bool {
        self.status(contract_address).await == Some(EscrowStatus::Approved)
    }

    /// Snapshot of all entries in deployment order
    pub async fn entries(&self) -> Vec<EscrowEntry> {
        self.entries.read().await.clone()
    }

    pub async fn records(&self) -> Vec<EscrowRecord> {
        self.entries
            .read()
            .await
            .iter()
            .map(|e| e.record.clone())
            .collect()
    }

    pub async fn views(&self) -> Vec<EscrowView> {
        self.entries.read().await.iter().map(EscrowEntry::to_view).collect()
    }

    /// Receiver that observes every change to the registry
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}

impl Default for EscrowRegistry {
    fn default() -> Self {
        Self::new()
    }
}
