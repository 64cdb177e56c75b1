pub mod advanced;
pub mod basic;
pub mod config;
pub mod core;
pub mod error;
pub mod types;
pub mod utils;

pub use crate::basic::app::EscrowApp;
pub use crate::basic::registry::{EscrowEntry, EscrowRegistry};
pub use crate::basic::session::SessionManager;
pub use crate::config::EscrowConfig;
pub use crate::core::contract::{ContractFactory, EscrowContract, PendingTransaction};
pub use crate::core::provider::WalletProvider;
pub use crate::core::signer::EscrowSigner;
pub use crate::error::{ErrorKind, EscrowSdkError, Result};
pub use crate::types::{Alert, DashboardView, EscrowRecord, EscrowStatus, FormDraft, Session};
pub use crate::utils::{format_ether, parse_ether, validate_address};
