use crate::core::signer::EscrowSigner;
use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Handle returned when subscribing to `accountsChanged`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The wallet host (browser extension) mediating account access and signing.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// `eth_accounts`: accounts already authorized for this origin. Never prompts.
    async fn accounts(&self) -> Result<Vec<String>, Box<dyn Error + Send + Sync>>;

    /// `eth_requestAccounts`: asks for authorization, may prompt the user.
    async fn request_accounts(&self) -> Result<Vec<String>, Box<dyn Error + Send + Sync>>;

    /// `wallet_requestPermissions` with `[{ eth_accounts: {} }]`.
    /// Re-prompts account selection even when a grant exists.
    async fn request_permissions(&self) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Signing handle bound to `address`.
    fn signer(&self, address: &str) -> Result<Arc<dyn EscrowSigner>, Box<dyn Error + Send + Sync>>;

    /// Subscribe to the `accountsChanged` channel. Each message is the full
    /// ordered account list; an empty list means the wallet disconnected.
    fn add_accounts_listener(&self) -> (ListenerId, UnboundedReceiver<Vec<String>>);

    fn remove_accounts_listener(&self, id: ListenerId);
}
