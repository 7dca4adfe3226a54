//! CLI command handling
//!
//! Dispatches CLI commands to the backend and formats output.

use std::path::Path;

use crate::api::ApiClient;
use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{paths, Error, Result};
use crate::session::{Role, Session};
use crate::workflow::{self, report, RunOptions, Scenario};

/// Dispatch a CLI command
pub async fn dispatch(
    command: Commands,
    config: &Config,
    config_file: Option<&Path>,
) -> Result<()> {
    if let Commands::Config = command {
        print_config(config, config_file);
        return Ok(());
    }

    let api = ApiClient::new(&config.server.base_url, config.timeout())?
        .with_preview_chars(config.output.preview_chars);

    match command {
        Commands::Config => Ok(()),

        Commands::Run {
            scenario,
            with_rejection,
            fresh_order,
            skip_warranties,
            skip_audit,
        } => {
            let mut scenario = match scenario {
                Some(path) => Scenario::load(&path)?,
                None => Scenario::default(),
            };
            if fresh_order {
                scenario.order.fresh = true;
            }

            let options = RunOptions {
                with_rejection,
                skip_warranties,
                skip_audit,
                list_preview: config.output.list_preview,
            };

            let report =
                workflow::run_workflow(&api, &config.accounts, &scenario, &options).await?;

            match report.failed_flow {
                None => Ok(()),
                Some(flow) => Err(Error::Assertion(format!(
                    "Workflow '{}' failed at {}: {}",
                    report.name,
                    flow.name(),
                    report.error.unwrap_or_default()
                ))),
            }
        }

        Commands::Login { role } => {
            let roles = match role {
                Some(role) => vec![role],
                None => Role::ALL.to_vec(),
            };
            let session = login(&api, config, &roles).await?;

            for (role, user) in session.users() {
                match user.user_id {
                    Some(id) => report::success(&format!(
                        "{}: {} (ID {}, role {})",
                        role,
                        user.username,
                        id,
                        user.backend_role.as_deref().unwrap_or("unknown")
                    )),
                    None => report::success(&format!(
                        "{}: {} (profile unavailable)",
                        role, user.username
                    )),
                }
            }
            Ok(())
        }

        Commands::Returns { all } => {
            let role = if all { Role::Manager } else { Role::Client };
            let session = login(&api, config, &[role]).await?;
            let token = session.token(role)?;
            let returns = if all {
                api.all_returns(token).await?
            } else {
                api.my_returns(token).await?
            };

            if returns.is_empty() {
                println!("No returns visible to {}", role);
            } else {
                println!("Returns ({}):", returns.len());
                for record in &returns {
                    println!(
                        "  #{} {} reason={} refund={}",
                        record.id,
                        record.status,
                        record
                            .reason
                            .as_ref()
                            .map(|r| r.as_str())
                            .unwrap_or("-"),
                        record
                            .refund_method
                            .as_ref()
                            .map(|m| m.as_str())
                            .unwrap_or("-"),
                    );
                }
            }
            Ok(())
        }

        Commands::Return { id } => {
            let session = login(&api, config, &[Role::Client]).await?;
            let record = api.get_return(session.token(Role::Client)?, id).await?;
            report::data(&format!("Return {}", id), &record);
            Ok(())
        }

        Commands::Evaluate { id } => {
            let session = login(&api, config, &[Role::Manager]).await?;
            let result = api
                .send_to_evaluation(session.token(Role::Manager)?, id)
                .await?;
            report::success(&format!("Return {} sent to evaluation", id));
            report::data("Result", &result);
            Ok(())
        }

        Commands::Approve { id, notes } => {
            let session = login(&api, config, &[Role::Manager]).await?;
            let result = api
                .approve_return(session.token(Role::Manager)?, id, &notes)
                .await?;
            report::success(&format!("Return {} approved", id));
            report::data("Result", &result);
            Ok(())
        }

        Commands::Reject { id, reason } => {
            if reason.trim().is_empty() {
                return Err(Error::Config("--reason must not be empty".to_string()));
            }
            let session = login(&api, config, &[Role::Manager]).await?;
            let result = api
                .reject_return(session.token(Role::Manager)?, id, &reason)
                .await?;
            report::success(&format!("Return {} rejected", id));
            report::data("Result", &result);
            Ok(())
        }

        Commands::Wallet => {
            let session = login(&api, config, &[Role::Client]).await?;
            let token = session.token(Role::Client)?;

            let wallet = api.my_wallet(token).await?;
            report::data("Wallet", &wallet);

            let balance = api.my_balance(token).await?;
            report::data("Balance", &balance);

            match api.my_transactions(token).await {
                Ok(transactions) => {
                    let shown = transactions.len().min(config.output.list_preview);
                    println!("Transactions: {} (showing {})", transactions.len(), shown);
                    report::data("Latest transactions", &transactions[..shown]);
                }
                Err(e) => report::warn(&format!("Transactions unavailable: {}", e)),
            }

            match api.wallet_statistics(token).await {
                Ok(stats) => report::data("Statistics", &stats),
                Err(e) => report::warn(&format!("Statistics unavailable: {}", e)),
            }
            Ok(())
        }

        Commands::Warranties { id } => {
            let session = login(&api, config, &[Role::Client]).await?;
            let token = session.token(Role::Client)?;

            match id {
                Some(id) => {
                    let warranty = api.get_warranty(token, id).await?;
                    report::data(&format!("Warranty {}", id), &warranty);
                }
                None => {
                    let warranties = api.list_warranties(token).await?;
                    if warranties.is_empty() {
                        println!("No warranties");
                    }
                    for warranty in &warranties {
                        println!(
                            "  #{} order={} product={} status={}",
                            warranty.id,
                            display_ref(warranty.order.map(|o| o.id())),
                            display_ref(warranty.product.map(|p| p.id())),
                            warranty.status.as_deref().unwrap_or("-")
                        );
                    }
                }
            }
            Ok(())
        }

        Commands::Audit { page_size } => {
            if page_size == 0 {
                return Err(Error::Config("--page-size must be at least 1".to_string()));
            }
            let session = login(&api, config, &[Role::Admin]).await?;
            let entries = api
                .audit_log(session.token(Role::Admin)?, page_size)
                .await?;
            println!("Audit entries: {}", entries.len());
            report::data("Entries", &entries);
            Ok(())
        }
    }
}

/// Log in only the roles a command acts as
async fn login(api: &ApiClient, config: &Config, roles: &[Role]) -> Result<Session> {
    let mut session = Session::new();
    for &role in roles {
        session
            .login(api, role, config.accounts.get(role))
            .await?;
    }
    Ok(session)
}

fn print_config(config: &Config, config_file: Option<&Path>) {
    let path = config_file
        .map(Path::to_path_buf)
        .or_else(paths::config_path);
    match path {
        Some(path) if path.exists() => println!("# Config file: {}", path.display()),
        Some(path) => println!("# Config file: {} (not found, using defaults)", path.display()),
        None => println!("# Config file: unavailable (no home directory)"),
    }

    println!("[server]");
    println!("base_url = \"{}\"", config.server.base_url);
    println!("timeout_secs = {}", config.server.timeout_secs);

    for role in Role::ALL {
        let credentials = config.accounts.get(role);
        println!("\n[accounts.{}]", role);
        println!("username = \"{}\"", credentials.username);
        println!("password = \"{}\"", mask(&credentials.password));
    }

    println!("\n[output]");
    println!("preview_chars = {}", config.output.preview_chars);
    println!("list_preview = {}", config.output.list_preview);
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "********"
    }
}

fn display_ref(id: Option<i64>) -> String {
    id.map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_hides_password() {
        assert_eq!(mask("admin123"), "********");
        assert_eq!(mask(""), "");
    }

    #[test]
    fn test_display_ref() {
        assert_eq!(display_ref(Some(9)), "9");
        assert_eq!(display_ref(None), "-");
    }
}
