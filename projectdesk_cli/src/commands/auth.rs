use anyhow::Result;
use clap::Args;
use projectdesk_lib::projectdesk_api::types::Credentials;
use projectdesk_lib::projectdesk_api::Client;

use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn login(args: &LoginArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let credentials = Credentials {
        email: args.email.trim().to_string(),
        password: args.password.clone(),
    };
    let session = client.login(&credentials).await?;

    match format {
        OutputFormat::Json => print_json(&session.user),
        _ => {
            let name = session
                .user
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or(&credentials.email);
            eprintln!("Logged in as {}", name);
        }
    }
    Ok(())
}

pub fn logout(client: &Client) {
    client.logout();
    eprintln!("Logged out");
}
