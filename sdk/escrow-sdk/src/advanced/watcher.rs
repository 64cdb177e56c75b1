use crate::basic::registry::EscrowRegistry;
use crate::core::contract::EscrowContract;
use crate::error::{EscrowSdkError, Result};
use futures::StreamExt;
use std::future::Future;
use tracing::{debug, info, warn};

/// Subscribe to `event` on `contract` and return the task that marks the
/// registry entry approved when the event arrives.
///
/// The subscription is opened before this returns, so an event emitted
/// right after registration is not missed. The task ends after the first
/// matching event or when the stream closes.
pub fn approval_watcher(
    registry: EscrowRegistry,
    contract: &dyn EscrowContract,
    event: &str,
) -> Result<impl Future<Output = ()> + Send + 'static> {
    let address = contract.address();
    let mut events = contract
        .events(event)
        .map_err(|e| EscrowSdkError::Contract(e.to_string()))?;
    debug!(%address, event, "watching for approval");

    Ok(async move {
        while let Some(ev) = events.next().await {
            if ev.contract_address != address {
                debug!(%address, from = %ev.contract_address, "ignoring foreign event");
                continue;
            }
            match registry.mark_approved(&address).await {
                Ok(true) => info!(%address, block = ev.block_number, "escrow approved"),
                Ok(false) => {},
                Err(e) => warn!(%address, error = %e, "approval for unknown escrow"),
            }
            return;
        }
        debug!(%address, "event stream closed");
    })
}
