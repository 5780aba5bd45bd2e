use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use projectdesk_lib::projectdesk_api::Client;
use projectdesk_lib::{
    resource_table, CacheConfig, ColumnFilter, LoadOutcome, QueryCache, Resource, SortDescriptor,
    TableQueryOptions,
};
use serde_json::Value;

use super::parse_pair;
use crate::output::{page_footer, print_field_errors, print_rows, OutputFormat};

#[derive(Args)]
pub struct ListArgs {
    /// Resource: projects, proposals, requests, documents, registrations, periods
    pub resource: String,

    /// Page number
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Results per page
    #[arg(long, default_value = "10")]
    pub page_size: u32,

    /// Column to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long)]
    pub desc: bool,

    /// Column filter as key=value (repeatable)
    #[arg(long)]
    pub filter: Vec<String>,

    /// Free-text search
    #[arg(long)]
    pub search: Option<String>,
}

/// Maps command-line flags onto table state.
pub fn build_options(args: &ListArgs) -> Result<TableQueryOptions> {
    if args.page == 0 {
        bail!("--page starts at 1");
    }
    if args.page_size == 0 {
        bail!("--page-size must be at least 1");
    }

    let mut options = TableQueryOptions::default()
        .with_page_index(args.page - 1)
        .with_page_size(args.page_size);

    if let Some(ref sort) = args.sort {
        options = options.with_sort(if args.desc {
            SortDescriptor::desc(sort)
        } else {
            SortDescriptor::asc(sort)
        });
    }

    options.column_filters = args
        .filter
        .iter()
        .map(|raw| parse_pair(raw).map(|(key, value)| ColumnFilter::new(&key, value)))
        .collect::<Result<Vec<_>>>()?;

    if let Some(ref search) = args.search {
        options = options.with_search(search);
    }
    Ok(options)
}

pub async fn run(args: &ListArgs, client: Arc<Client>, format: &OutputFormat) -> Result<()> {
    let resource: Resource = args.resource.parse()?;
    let options = build_options(args)?;

    let cache = Arc::new(QueryCache::new(CacheConfig::from_env()));
    let table = resource_table::<Value>(client, cache, resource).with_options(options);

    if table.load().await == LoadOutcome::Failed {
        if let Some(err) = table.view().error {
            print_field_errors(&err.errors());
            return Err(err.into());
        }
    }

    let view = table.view();
    eprintln!("{}", page_footer(&view, resource.namespace()));
    print_rows(&view.data, format);
    Ok(())
}
