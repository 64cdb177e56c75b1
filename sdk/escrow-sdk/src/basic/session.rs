use crate::core::constants::{
    ACCOUNTS_CHANGED, ETH_ACCOUNTS, ETH_REQUEST_ACCOUNTS, WALLET_REQUEST_PERMISSIONS,
};
use crate::core::provider::{ListenerId, WalletProvider};
use crate::core::signer::EscrowSigner;
use crate::error::{EscrowSdkError, Result};
use crate::types::Session;
use std::future::poll_fn;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::Poll;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// `accountsChanged` receiver plus the transition counter. Whoever holds the
/// lock applies every delivered notification before its own write.
struct Inbox {
    notifications: mpsc::UnboundedReceiver<Vec<String>>,
    /// Bumped on every applied account list or clear
    epoch: u64,
}

struct Shared {
    provider: Arc<dyn WalletProvider>,
    state: watch::Sender<Option<Session>>,
    inbox: Mutex<Inbox>,
    torn_down: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inbox> {
        self.inbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn drain(&self, inbox: &mut Inbox) {
        while let Ok(accounts) = inbox.notifications.try_recv() {
            self.apply(inbox, &accounts);
        }
    }

    fn apply(&self, inbox: &mut Inbox, accounts: &[String]) {
        inbox.epoch += 1;
        apply_accounts(self.provider.as_ref(), &self.state, accounts);
    }

    fn clear(&self, inbox: &mut Inbox) {
        inbox.epoch += 1;
        self.state.send_replace(None);
        debug!("session cleared");
    }

    /// Run `write` after every notification delivered so far. No-op once
    /// torn down.
    fn transition(&self, write: impl FnOnce(&Self, &mut Inbox)) {
        let mut inbox = self.lock();
        if self.torn_down.load(Ordering::SeqCst) {
            debug!("session torn down, update dropped");
            return;
        }
        self.drain(&mut inbox);
        write(self, &mut *inbox);
    }
}

/// Mirrors the wallet's authorization state as an `Option<Session>`.
///
/// Notifications and local writes (manual account changes, the logout clear,
/// the initial lookup) go through one lock, and each local write first
/// applies the notifications already delivered. The final session therefore
/// follows arrival order.
pub struct SessionManager {
    shared: Arc<Shared>,
    listener: ListenerId,
    task: JoinHandle<()>,
}

impl SessionManager {
    /// Subscribe to `accountsChanged` and adopt the accounts the wallet has
    /// already authorized, without prompting.
    pub async fn initialize(provider: Arc<dyn WalletProvider>) -> Self {
        let (state, _) = watch::channel(None);
        let (listener, notifications) = provider.add_accounts_listener();
        debug!(?listener, channel = ACCOUNTS_CHANGED, "subscribed");

        let shared = Arc::new(Shared {
            provider,
            state,
            inbox: Mutex::new(Inbox {
                notifications,
                epoch: 0,
            }),
            torn_down: AtomicBool::new(false),
        });
        let task = tokio::spawn(listen(shared.clone()));
        let manager = Self {
            shared,
            listener,
            task,
        };

        let started_at = manager.shared.lock().epoch;
        match manager.shared.provider.accounts().await {
            Ok(accounts) => manager.shared.transition(|shared, inbox| {
                if inbox.epoch == started_at {
                    shared.apply(inbox, &accounts);
                } else {
                    debug!("initial accounts superseded by a notification");
                }
            }),
            Err(e) => warn!(method = ETH_ACCOUNTS, error = %e, "initial account lookup failed"),
        }

        manager
    }

    /// Apply an account list as if the provider had delivered it.
    /// Idempotent for a repeated list.
    pub async fn on_accounts_changed(&self, accounts: Vec<String>) {
        self.shared
            .transition(|shared, inbox| shared.apply(inbox, &accounts));
    }

    /// Send `eth_requestAccounts`. The session is not written here; it
    /// converges through the resulting `accountsChanged` notification.
    pub async fn request_login(&self) -> Result<Vec<String>> {
        self.shared
            .provider
            .request_accounts()
            .await
            .map_err(|e| EscrowSdkError::Provider(e.to_string()))
    }

    /// Ask the wallet for authorization. Returns whether the wallet granted
    /// the request; failures are only logged.
    pub async fn login(&self) -> bool {
        match self.request_login().await {
            Ok(accounts) => {
                debug!(granted = accounts.len(), "login request accepted");
                true
            },
            Err(e) => {
                warn!(method = ETH_REQUEST_ACCOUNTS, error = %e, "login failed");
                false
            },
        }
    }

    /// Send `wallet_requestPermissions` and clear the session once the wallet
    /// answers. On failure the session is left as is.
    pub async fn request_logout(&self) -> Result<()> {
        self.shared
            .provider
            .request_permissions()
            .await
            .map_err(|e| EscrowSdkError::Provider(e.to_string()))?;
        self.shared.transition(Shared::clear);
        Ok(())
    }

    /// Re-prompt wallet permissions and clear the session locally. Returns
    /// whether the wallet answered; failures are only logged.
    pub async fn logout(&self) -> bool {
        match self.request_logout().await {
            Ok(()) => true,
            Err(e) => {
                warn!(method = WALLET_REQUEST_PERMISSIONS, error = %e, "logout failed");
                false
            },
        }
    }

    /// Apply every notification the provider has delivered so far.
    pub async fn sync(&self) {
        self.shared.transition(|_, _| {});
    }

    /// Unsubscribe from the provider and stop applying updates.
    /// The last session value stays readable.
    pub fn teardown(&self) {
        if self.shared.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.provider.remove_accounts_listener(self.listener);
        self.task.abort();
        debug!(listener = ?self.listener, "session manager torn down");
    }

    pub fn session(&self) -> Option<Session> {
        self.shared.state.borrow().clone()
    }

    /// Connected address, empty when there is no session
    pub fn address(&self) -> String {
        self.shared
            .state
            .borrow()
            .as_ref()
            .map(|s| s.address.clone())
            .unwrap_or_default()
    }

    pub fn signer(&self) -> Option<Arc<dyn EscrowSigner>> {
        self.shared.state.borrow().as_ref().map(|s| s.signer.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.shared.state.borrow().is_some()
    }

    /// Receiver notified on every session replacement
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.shared.state.subscribe()
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Apply notifications as they arrive. The lock is taken inside each poll, so
/// a notification is applied either here or by a local write draining the
/// inbox, never after a later write.
async fn listen(shared: Arc<Shared>) {
    poll_fn(|cx| {
        let mut inbox = shared.lock();
        loop {
            match inbox.notifications.poll_recv(cx) {
                Poll::Ready(Some(accounts)) => shared.apply(&mut *inbox, &accounts),
                Poll::Ready(None) => return Poll::Ready(()),
                Poll::Pending => return Poll::Pending,
            }
        }
    })
    .await;
    debug!(channel = ACCOUNTS_CHANGED, "notification channel closed");
}

/// Rebuild the session from the first account, or clear it on an empty list.
/// If no signer can be bound for that account the session is cleared.
fn apply_accounts(
    provider: &dyn WalletProvider,
    state: &watch::Sender<Option<Session>>,
    accounts: &[String],
) {
    let Some(address) = accounts.first() else {
        state.send_replace(None);
        debug!("wallet reported no accounts, session cleared");
        return;
    };

    match provider.signer(address) {
        Ok(signer) => {
            state.send_replace(Some(Session::new(address.clone(), signer)));
            debug!(%address, "session established");
        },
        Err(e) => {
            state.send_replace(None);
            warn!(%address, error = %e, "could not bind signer, session cleared");
        },
    }
}
