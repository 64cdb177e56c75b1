use crate::basic::actions::ApprovalAction;
use crate::core::signer::EscrowSigner;
use crate::error::ErrorKind;
use crate::utils;
use serde::Serialize;
use std::sync::Arc;

/// A connected wallet account and the signer bound to it.
/// "No session" is represented as `Option<Session>::None`.
#[derive(Clone, Debug)]
pub struct Session {
    pub signer: Arc<dyn EscrowSigner>,
    pub address: String,
}

impl Session {
    pub fn new(address: String, signer: Arc<dyn EscrowSigner>) -> Self {
        Self { signer, address }
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.signer.address() == other.signer.address()
    }
}

impl Eq for Session {}

/// Display state of an escrow entry. Moves from `Pending` to `Approved` once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EscrowStatus {
    #[default]
    Pending,
    Approved,
}

/// An escrow deployed during this session.
#[derive(Clone, Debug)]
pub struct EscrowRecord {
    /// Contract address, also the rendering identity of the entry
    pub contract_address: String,

    pub arbiter: String,

    pub beneficiary: String,

    /// Deposited amount in wei
    pub amount: u128,

    /// Approval bound to this contract and the signer active at deploy time
    pub approval: ApprovalAction,
}

/// Transient form input. The amount is carried in wei and shown as ether.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    pub arbiter: String,
    pub beneficiary: String,
    pub amount: u128,
}

impl FormDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the amount from ether text. Text that does not parse is
    /// ignored and the previous amount is kept.
    pub fn set_amount_text(&mut self, text: &str) -> bool {
        match utils::parse_ether(text) {
            Ok(wei) => {
                self.amount = wei;
                true
            },
            Err(_) => false,
        }
    }

    pub fn amount_text(&self) -> String {
        utils::format_ether(self.amount)
    }
}

//=============================================================================
// Presentation Models
//=============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftView {
    pub arbiter: String,
    pub beneficiary: String,
    pub amount_ether: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscrowView {
    pub address: String,
    pub arbiter: String,
    pub beneficiary: String,
    pub amount_wei: String,
    pub amount_ether: String,
    pub approved: bool,
}

/// Snapshot of everything the rendering layer draws
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    /// Current depositor account, empty when disconnected
    pub account: String,
    pub connected: bool,
    pub draft: DraftView,
    pub escrows: Vec<EscrowView>,
}

/// Blocking, user-visible message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub kind: ErrorKind,
    pub message: String,
}
