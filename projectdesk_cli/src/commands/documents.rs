use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use projectdesk_lib::projectdesk_api::Client;
use projectdesk_lib::upload_document;

use super::parse_pair;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct UploadArgs {
    /// File to upload
    #[arg(long)]
    pub file: PathBuf,

    /// Extra form field as key=value (repeatable)
    #[arg(long)]
    pub field: Vec<String>,
}

#[derive(Args)]
pub struct DownloadArgs {
    /// Document id
    pub id: String,

    /// Where to write the file
    #[arg(long)]
    pub out: PathBuf,
}

pub async fn upload(args: &UploadArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    if !args.file.is_file() {
        bail!("no such file: {}", args.file.display());
    }
    let fields = args
        .field
        .iter()
        .map(|raw| parse_pair(raw))
        .collect::<Result<Vec<_>>>()?;

    let data = upload_document(client, &args.file, &fields).await?;
    match format {
        OutputFormat::Json => print_json(&data),
        _ => eprintln!(
            "Uploaded {} (id {})",
            args.file.display(),
            data.get("id").map(|id| id.to_string()).unwrap_or_default()
        ),
    }
    Ok(())
}

pub fn download_path(id: &str) -> String {
    format!("/documents/{}/download", id.trim())
}

pub async fn download(args: &DownloadArgs, client: &Client) -> Result<()> {
    let bytes = client.download(&download_path(&args.id)).await?;
    tokio::fs::write(&args.out, &bytes).await?;
    eprintln!("Wrote {} bytes to {}", bytes.len(), args.out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_path() {
        assert_eq!(download_path(" 42 "), "/documents/42/download");
    }
}
