/// Abstraction for a capability that signs on behalf of one account.
/// This allows the SDK to work with:
/// 1. Browser wallet extensions (signing is delegated to the extension)
/// 2. Local keys (scripts and tests)
pub trait EscrowSigner: Send + Sync {
    /// Account address this signer produces signatures for.
    fn address(&self) -> String;
}

impl std::fmt::Debug for dyn EscrowSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscrowSigner")
            .field("address", &self.address())
            .finish()
    }
}
