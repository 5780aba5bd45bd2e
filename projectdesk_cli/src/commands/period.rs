use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use projectdesk_lib::projectdesk_api::Client;
use projectdesk_lib::{PeriodGate, PeriodType};

use crate::output::{print_period, OutputFormat};

#[derive(Args)]
pub struct PeriodArgs {
    /// Period type: proposal_submission, project_registration, document_submission, evaluation
    pub period_type: String,
}

pub async fn run(args: &PeriodArgs, client: Arc<Client>, format: &OutputFormat) -> Result<()> {
    let period_type: PeriodType = args.period_type.parse()?;
    let gate = PeriodGate::new(client);
    let status = gate.check(period_type).await;
    print_period(&status, format);
    Ok(())
}
