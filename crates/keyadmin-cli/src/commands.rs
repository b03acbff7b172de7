//! Subcommand handlers

use super::{
    BankCommands, Commands, KeyCommands, PackageArgs, PackageCommands, ProviderCommands,
    ProxyCommands,
};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use keyadmin_core::proxy::{AutoAssignRequest, NewProxy, ProxyListQuery, ProxyUpdate};
use keyadmin_core::types::{KeyDetailsUpdate, NewKey, PackageInput, ProviderKeyInput};
use keyadmin_core::{BankInfo, KeySummary};
use keyadmin_gateway::{Fetched, Gateway};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

/// Run one subcommand against the gateway
pub(crate) async fn run(gateway: &Gateway, command: Commands) -> Result<()> {
    match command {
        Commands::Status => {
            let snapshot = gateway.availability().snapshot();
            print_json(&json!({
                "baseUrl": gateway.base_url(),
                "available": snapshot.available,
                "lastCheckedAt": snapshot.last_checked_at,
            }))
        }
        // Handled before the gateway is built
        Commands::Config => Ok(()),
        Commands::Keys { action } => keys(gateway, action).await,
        Commands::Providers { action } => providers(gateway, action).await,
        Commands::Packages { action } => packages(gateway, action).await,
        Commands::Audit => print_fetched(&gateway.list_audit_log().await),
        Commands::Stats => print_fetched(&gateway.dashboard_stats().await),
        Commands::Proxies { action } => proxies(gateway, action).await,
        Commands::Bank { action } => bank(gateway, action).await,
    }
}

async fn keys(gateway: &Gateway, action: KeyCommands) -> Result<()> {
    match action {
        KeyCommands::List { summary: false } => print_fetched(&gateway.list_keys().await),
        KeyCommands::List { summary: true } => print_fetched(
            &gateway
                .list_keys()
                .await
                .map(|keys| KeySummary::from_keys(&keys, Utc::now())),
        ),
        KeyCommands::Create {
            credit,
            note,
            expires_in,
            max_activations,
            trial,
            inactive,
        } => {
            let key = NewKey {
                credit,
                note,
                expired_at: expires_in.map(|days| Utc::now() + Duration::days(days)),
                is_active: !inactive,
                max_activations,
                is_trial: trial,
            };
            print_json(&gateway.create_key(&key).await?)
        }
        KeyCommands::Credit { key, amount } => {
            print_json(&gateway.update_credit(&key, amount).await?)
        }
        KeyCommands::Update {
            id,
            note,
            expires_in,
            max_activations,
            trial,
        } => {
            let update = KeyDetailsUpdate {
                note,
                expired_at: expires_in.map(|days| Utc::now() + Duration::days(days)),
                max_activations,
                is_trial: trial,
            };
            print_json(&gateway.update_key_details(&id, &update).await?)
        }
        KeyCommands::Activate { id } => print_json(&gateway.update_key_status(&id, true).await?),
        KeyCommands::Deactivate { id } => {
            print_json(&gateway.update_key_status(&id, false).await?)
        }
        KeyCommands::Revoke { key } => print_json(&gateway.revoke_key(&key).await?),
    }
}

async fn providers(gateway: &Gateway, action: ProviderCommands) -> Result<()> {
    match action {
        ProviderCommands::List => print_fetched(&gateway.list_providers().await),
        ProviderCommands::Create { name } => print_json(&gateway.create_provider(&name).await?),
        ProviderCommands::AddKey {
            provider_id,
            key,
            nickname,
        } => print_json(
            &gateway
                .add_provider_key(&provider_id, &ProviderKeyInput { key, nickname })
                .await?,
        ),
        ProviderCommands::RemoveKey {
            provider_id,
            key_id,
        } => print_json(&gateway.delete_provider_key(&provider_id, &key_id).await?),
    }
}

impl From<PackageArgs> for PackageInput {
    fn from(args: PackageArgs) -> Self {
        Self {
            name: args.name,
            price: args.price,
            credits: args.credits,
            bonus: args.bonus,
            description: args.description,
            is_popular: args.popular,
            is_active: !args.inactive,
        }
    }
}

async fn packages(gateway: &Gateway, action: PackageCommands) -> Result<()> {
    match action {
        PackageCommands::List => print_fetched(&gateway.list_packages().await),
        PackageCommands::Create(args) => {
            print_json(&gateway.create_package(&args.into()).await?)
        }
        PackageCommands::Update { id, package } => {
            print_json(&gateway.update_package(&id, &package.into()).await?)
        }
        PackageCommands::Delete { id } => print_json(&gateway.delete_package(&id).await?),
    }
}

async fn proxies(gateway: &Gateway, action: ProxyCommands) -> Result<()> {
    match action {
        ProxyCommands::List {
            page,
            limit,
            status,
            location,
            assigned,
        } => {
            let query = ProxyListQuery {
                page,
                limit,
                status,
                location,
                assigned,
            };
            print_fetched(&gateway.list_proxies(&query).await)
        }
        ProxyCommands::Stats => print_fetched(&gateway.proxy_stats().await),
        ProxyCommands::Add {
            name,
            host,
            port,
            protocol,
            username,
            password,
            location,
            provider,
            notes,
        } => {
            let proxy = NewProxy {
                name,
                host,
                port,
                username,
                password,
                protocol,
                location,
                provider,
                notes,
            };
            print_json(&gateway.create_proxy(&proxy).await?)
        }
        ProxyCommands::Update {
            id,
            name,
            host,
            port,
            protocol,
            active,
            location,
            notes,
        } => {
            let update = ProxyUpdate {
                name,
                host,
                port,
                protocol,
                is_active: active,
                location,
                notes,
            };
            print_json(&gateway.update_proxy(&id, &update).await?)
        }
        ProxyCommands::Delete { id } => print_json(&gateway.delete_proxy(&id).await?),
        ProxyCommands::Test { id } => print_json(&gateway.test_proxy(&id).await?),
        ProxyCommands::TestAll => print_json(&gateway.batch_test_proxies().await?),
        ProxyCommands::AutoAssign { provider, force } => {
            let request = AutoAssignRequest {
                provider,
                force_reassign: force.then_some(true),
            };
            print_json(&gateway.auto_assign_proxies(&request).await?)
        }
    }
}

async fn bank(gateway: &Gateway, action: BankCommands) -> Result<()> {
    match action {
        BankCommands::Show => print_fetched(&gateway.bank_info().await),
        BankCommands::Set {
            bank_name,
            account_number,
            account_name,
            branch_name,
            note,
        } => {
            let info = BankInfo {
                bank_name,
                account_number,
                account_name,
                branch_name,
                note,
            };
            print_json(&gateway.update_bank_info(&info).await?)
        }
    }
}

fn print_fetched<T: Serialize>(fetched: &Fetched<T>) -> Result<()> {
    if fetched.is_fallback() {
        warn!("backend unavailable, showing example data");
    }
    print_json(fetched)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_package_args_conversion() {
        let input: PackageInput = PackageArgs {
            name: "Pro".to_string(),
            price: 200_000.0,
            credits: 5_000,
            bonus: Some("+10%".to_string()),
            description: None,
            popular: true,
            inactive: false,
        }
        .into();

        assert_eq!(input.name, "Pro");
        assert_eq!(input.credits, 5_000);
        assert!(input.is_popular);
        assert!(input.is_active);
    }
}
