//! `login` command: verify credentials and show the session

use anyhow::{Context, Result};
use colored::*;
use tokio_util::sync::CancellationToken;

use super::ConnectionArgs;

pub async fn handle_login_command(args: &ConnectionArgs, cancel: &CancellationToken) -> Result<()> {
    let context = args.connect()?;
    let company = context
        .manager()
        .options()
        .company_db
        .clone()
        .unwrap_or_default();

    context
        .login(cancel)
        .await
        .with_context(|| format!("Failed to log into company '{}'", company))?;

    if let Some(session) = context.session() {
        println!("{} {}", "Logged in to".bright_green(), company.bold());
        println!("  Session:  {}", session.id.dimmed());
        println!("  Timeout:  {} min", session.timeout_minutes);
        println!(
            "  Expires:  {}",
            session.expires_at().format("%Y-%m-%d %H:%M:%S UTC")
        );
        if let Some(route) = &session.route_id {
            println!("  Route:    {}", route);
        }
    }

    context.logout(cancel).await;
    Ok(())
}
