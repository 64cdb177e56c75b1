use thiserror::Error;

/// SDK-specific error types for escrow dApp operations
#[derive(Debug, Error)]
pub enum EscrowSdkError {
    /// Address input failed the syntactic check
    #[error("Invalid {field} address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    /// Amount text could not be converted to wei
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// No wallet session is active
    #[error("Wallet not connected")]
    NotConnected,

    /// Wallet provider error or user rejection
    #[error("Provider error: {0}")]
    Provider(String),

    /// Deployment or approval failed in the contract layer
    #[error("Contract error: {0}")]
    Contract(String),

    /// Transaction was mined but reverted
    #[error("Transaction {0} reverted")]
    Reverted(String),

    /// No escrow with this contract address in the registry
    #[error("Escrow not found: {0}")]
    EscrowNotFound(String),

    /// Confirmation wait exceeded the configured timeout
    #[error("Timed out after {0}s waiting for confirmation")]
    Timeout(u64),

    /// The owning app was shut down while the call was in flight
    #[error("Operation cancelled by shutdown")]
    Cancelled,

    /// Configuration parse error
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Coarse classification used when deciding how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ErrorKind {
    /// Malformed user input, detected before any network call
    Validation,
    /// Wallet declined or failed a request
    Provider,
    /// Deployment or approval failed on chain
    Contract,
    /// Session or app lifecycle (not connected, cancelled, config)
    Lifecycle,
}

impl EscrowSdkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAddress { .. } | Self::InvalidAmount(_) => ErrorKind::Validation,
            Self::Provider(_) => ErrorKind::Provider,
            Self::Contract(_) | Self::Reverted(_) | Self::Timeout(_) => ErrorKind::Contract,
            Self::NotConnected
            | Self::EscrowNotFound(_)
            | Self::Cancelled
            | Self::Config(_)
            | Self::Other(_) => ErrorKind::Lifecycle,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, EscrowSdkError>;
