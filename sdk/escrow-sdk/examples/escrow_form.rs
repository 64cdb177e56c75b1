// Example: preparing an escrow deployment from form input
//
// This example demonstrates how to:
// 1. Carry the amount in wei while editing it as ether text
// 2. Validate the arbiter and beneficiary addresses
// 3. Build the deploy request the dashboard would submit

use escrow_sdk::basic::actions::DeployEscrowBuilder;
use escrow_sdk::{EscrowConfig, FormDraft};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = EscrowConfig::from_json_str(r#"{ "confirmations": 2 }"#)?;
    info!(?config, "loaded config");

    // 1. Fill the form
    let mut draft = FormDraft::new();
    draft.arbiter = "0x1111111111111111111111111111111111111111".to_string();
    draft.beneficiary = "0x123".to_string();
    draft.set_amount_text("0.001");
    // ignored, the previous amount is kept
    draft.set_amount_text("abc");
    info!(wei = %draft.amount, ether = %draft.amount_text(), "amount");

    // 2. Validation catches the short beneficiary before any network call
    let builder = DeployEscrowBuilder::from_draft(&draft);
    if let Err(e) = builder.validate() {
        info!(error = %e, "validation failed");
    }

    // 3. Fix the input and validate again
    draft.beneficiary = "0x2222222222222222222222222222222222222222".to_string();
    let builder = DeployEscrowBuilder::from_draft(&draft);
    builder.validate()?;
    info!(
        arbiter = builder.arbiter(),
        beneficiary = builder.beneficiary(),
        "ready to deploy"
    );

    // In a real application you would:
    // let app = EscrowApp::activate(provider, factory, config).await;
    // let address = app.deploy().await?;
    // app.approve(&address).await?;

    Ok(())
}
