pub mod constants;
pub mod contract;
pub mod provider;
pub mod signer;
