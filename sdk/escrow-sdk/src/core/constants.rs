// EIP-1193 request methods
pub const ETH_ACCOUNTS: &str = "eth_accounts";
pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const WALLET_REQUEST_PERMISSIONS: &str = "wallet_requestPermissions";

// Provider notification channel
pub const ACCOUNTS_CHANGED: &str = "accountsChanged";

// Escrow contract event emitted once the arbiter releases funds
pub const APPROVED_EVENT: &str = "Approved";

pub const ETHER_DECIMALS: u32 = 18;
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;
