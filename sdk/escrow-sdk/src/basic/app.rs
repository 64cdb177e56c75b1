use crate::advanced::lifetime::Lifetime;
use crate::advanced::watcher::approval_watcher;
use crate::basic::actions::{ApprovalAction, DeployEscrowBuilder};
use crate::basic::registry::EscrowRegistry;
use crate::basic::session::SessionManager;
use crate::config::EscrowConfig;
use crate::core::contract::{ContractFactory, TransactionReceipt};
use crate::core::provider::WalletProvider;
use crate::error::{EscrowSdkError, Result};
use crate::types::{Alert, DashboardView, DraftView, EscrowRecord, FormDraft};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Controller behind the escrow dashboard.
///
/// Owns the wallet session, the form draft, the escrow registry and every
/// background task started on their behalf. User-initiated failures (deploy,
/// approve) are pushed to the alert channel and returned; ambient failures
/// (login, logout, account updates) are only logged.
pub struct EscrowApp {
    config: EscrowConfig,
    session: SessionManager,
    factory: Arc<dyn ContractFactory>,
    registry: EscrowRegistry,
    draft: Mutex<FormDraft>,
    alerts: mpsc::UnboundedSender<Alert>,
    alert_rx: Mutex<Option<mpsc::UnboundedReceiver<Alert>>>,
    lifetime: Lifetime,
}

impl EscrowApp {
    /// Activate against a wallet provider and contract factory.
    pub async fn activate(
        provider: Arc<dyn WalletProvider>,
        factory: Arc<dyn ContractFactory>,
        config: EscrowConfig,
    ) -> Self {
        let session = SessionManager::initialize(provider).await;
        let (alerts, alert_rx) = mpsc::unbounded_channel();

        Self {
            config,
            session,
            factory,
            registry: EscrowRegistry::new(),
            draft: Mutex::new(FormDraft::new()),
            alerts,
            alert_rx: Mutex::new(Some(alert_rx)),
            lifetime: Lifetime::new(),
        }
    }

    pub fn config(&self) -> &EscrowConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn registry(&self) -> &EscrowRegistry {
        &self.registry
    }

    /// Alert receiver for the rendering layer. Can be taken once.
    pub fn take_alerts(&self) -> Option<mpsc::UnboundedReceiver<Alert>> {
        self.alert_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    //=========================================================================
    // Wallet
    //=========================================================================

    pub async fn login(&self) -> bool {
        self.lifetime
            .guard(async { Ok::<_, EscrowSdkError>(self.session.login().await) })
            .await
            .unwrap_or(false)
    }

    pub async fn logout(&self) -> bool {
        self.lifetime
            .guard(async { Ok::<_, EscrowSdkError>(self.session.logout().await) })
            .await
            .unwrap_or(false)
    }

    //=========================================================================
    // Form
    //=========================================================================

    pub fn draft(&self) -> FormDraft {
        self.lock_draft().clone()
    }

    pub fn set_arbiter(&self, arbiter: impl Into<String>) {
        self.lock_draft().arbiter = arbiter.into();
    }

    pub fn set_beneficiary(&self, beneficiary: impl Into<String>) {
        self.lock_draft().beneficiary = beneficiary.into();
    }

    /// Amount in wei
    pub fn set_amount(&self, amount: u128) {
        self.lock_draft().amount = amount;
    }

    /// Amount as ether text; non-numeric text is ignored
    pub fn set_amount_text(&self, text: &str) -> bool {
        self.lock_draft().set_amount_text(text)
    }

    //=========================================================================
    // Escrows
    //=========================================================================

    /// Deploy an escrow from the current draft and register it.
    ///
    /// Malformed addresses are reported without contacting the factory. The
    /// draft is left as entered after a successful deploy.
    pub async fn deploy(&self) -> Result<String> {
        let builder = DeployEscrowBuilder::from_draft(&self.draft());
        if let Err(e) = builder.validate() {
            return Err(self.report(e));
        }
        let Some(signer) = self.session.signer() else {
            return Err(self.report(EscrowSdkError::NotConnected));
        };

        let contract = self
            .lifetime
            .guard(builder.deploy(self.factory.as_ref(), signer.clone()))
            .await
            .map_err(|e| self.report(e))?;
        let address = contract.address();

        // subscribe before the entry becomes visible so no approval is missed
        let watcher = approval_watcher(
            self.registry.clone(),
            contract.as_ref(),
            &self.config.approved_event,
        );

        let record = EscrowRecord {
            contract_address: address.clone(),
            arbiter: builder.arbiter().to_string(),
            beneficiary: builder.beneficiary().to_string(),
            amount: builder.amount(),
            approval: ApprovalAction::new(contract, signer),
        };
        self.registry.push(record).await.map_err(|e| self.report(e))?;

        match watcher {
            Ok(task) => self.lifetime.spawn(task),
            Err(e) => warn!(%address, error = %e, "approval events unavailable"),
        }

        info!(%address, "escrow added to dashboard");
        Ok(address)
    }

    /// Run the approve action of the escrow at `contract_address`.
    ///
    /// The entry's approved flag is driven by the contract event only, not by
    /// this call returning.
    pub async fn approve(&self, contract_address: &str) -> Result<TransactionReceipt> {
        let entry = self
            .registry
            .get(contract_address)
            .await
            .ok_or_else(|| EscrowSdkError::EscrowNotFound(contract_address.to_string()))
            .map_err(|e| self.report(e))?;

        self.lifetime
            .guard(entry.record.approval.run(&self.config))
            .await
            .map_err(|e| self.report(e))
    }

    pub async fn view(&self) -> DashboardView {
        let draft = self.draft();
        DashboardView {
            account: self.session.address(),
            connected: self.session.is_connected(),
            draft: DraftView {
                amount_ether: draft.amount_text(),
                arbiter: draft.arbiter,
                beneficiary: draft.beneficiary,
            },
            escrows: self.registry.views().await,
        }
    }

    /// Cancel in-flight calls, stop event watchers and unsubscribe from the
    /// wallet. Safe to call more than once.
    pub fn shutdown(&self) {
        self.lifetime.shutdown();
        self.session.teardown();
    }

    fn lock_draft(&self) -> MutexGuard<'_, FormDraft> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Surface `err` as an alert unless it comes from shutdown.
    fn report(&self, err: EscrowSdkError) -> EscrowSdkError {
        if !matches!(err, EscrowSdkError::Cancelled) {
            warn!(error = %err, "operation failed");
            let _ = self.alerts.send(Alert {
                kind: err.kind(),
                message: err.to_string(),
            });
        }
        err
    }
}
