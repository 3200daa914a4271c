//! Binary to exercise identity resolution and ISIN lookup against a live
//! back-office server.
//!
//! # Usage
//!
//! ```sh
//! export BACKOFFICE_BASE_URL="https://backoffice.example.com/api"
//! export BACKOFFICE_ACCESS_TOKEN="your-access-token"
//! cargo run --bin onboarding_check --features cli -- MA0001 INE002A01018
//! ```
//!
//! The first argument is an investor unique code, the optional second one
//! an ISIN to look up in the market list.

use std::env;

use wealth_onboard::BackofficeClient;
use wealth_onboard::config::ClientConfig;
use wealth_onboard::draft::{DraftAction, Section, Wizard};
use wealth_onboard::error::OnboardError;

#[tokio::main]
async fn main() -> wealth_onboard::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = env::args().skip(1);
    let investor_code = args
        .next()
        .ok_or_else(|| OnboardError::InvalidArgument("usage: onboarding_check <investor-code> [isin]".into()))?;
    let isin = args.next();

    let config = ClientConfig::from_env()?;
    println!("Connecting to {}…", config.base_url);
    let client = BackofficeClient::from_config(&config)?;

    let mut wizard = Wizard::default();
    wizard.dispatch(DraftAction::SetField {
        path: "customerProfile.investorCode".into(),
        value: investor_code.clone().into(),
    });

    println!("Resolving investor {investor_code}…");
    let applied = wizard.resolve_holder(&client, 0).await?;
    let draft = wizard.draft();
    match draft.customer_profile.investor_id.as_deref() {
        Some(id) if applied => {
            let primary = &draft.holders[0];
            println!("  investor id:  {id}");
            println!("  name:         {}", primary.name);
            println!("  PAN:          {}", primary.pan);
            println!("  minor:        {}", primary.is_minor);
            println!("  residential:  {}", draft.customer_profile.residential_status);
        }
        _ => println!("  no investor found for {investor_code}"),
    }

    let accounts = wizard.load_bank_accounts(&client).await?;
    println!("  bank accounts: {accounts}");
    for account in wizard.bank_accounts() {
        println!("    {} {} ({})", account.id, account.bank_name, account.ifsc_code);
    }

    for (section, status) in wizard.sections() {
        if section == Section::Holders || section == Section::CustomerProfile {
            println!("  {section}: {status:?}");
        }
    }

    if let Some(isin) = isin {
        println!("\nLooking up ISIN {isin}…");
        match client.lookup_by_isin(&isin).await? {
            Some(entry) => println!("{entry:#?}"),
            None => println!("  no market-list entry for {isin}"),
        }
    }

    println!("Done.");
    Ok(())
}
