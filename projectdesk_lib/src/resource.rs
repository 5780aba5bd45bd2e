//! The backend's list resources and the fetch functions that load them.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use projectdesk_api::multipart::{Form, Part};
use projectdesk_api::types::TableResponse;
use projectdesk_api::{Client, WireQueryParams};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache::QueryCache;
use crate::controller::{fetch_fn, FetchFn, TableDataController};
use crate::error::ProjectDeskError;

/// A list endpoint screens can page through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Projects,
    Proposals,
    Requests,
    Documents,
    Registrations,
    Periods,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Projects,
        Resource::Proposals,
        Resource::Requests,
        Resource::Documents,
        Resource::Registrations,
        Resource::Periods,
    ];

    /// Cache namespace for this resource's queries.
    pub fn namespace(&self) -> &'static str {
        match self {
            Resource::Projects => "projects",
            Resource::Proposals => "proposals",
            Resource::Requests => "requests",
            Resource::Documents => "documents",
            Resource::Registrations => "registrations",
            Resource::Periods => "periods",
        }
    }

    /// API path of the list endpoint.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Projects => "/projects",
            Resource::Proposals => "/proposals",
            Resource::Requests => "/requests",
            Resource::Documents => "/documents",
            Resource::Registrations => "/registrations",
            Resource::Periods => "/periods",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

impl FromStr for Resource {
    type Err = ProjectDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Resource::ALL
            .into_iter()
            .find(|r| r.namespace() == name)
            .ok_or_else(|| {
                ProjectDeskError::InvalidInput(format!(
                    "unknown resource '{}', expected one of: {}",
                    s,
                    Resource::ALL.map(|r| r.namespace()).join(", ")
                ))
            })
    }
}

/// Fetch function for a controller backed by `resource`'s list endpoint.
pub fn resource_fetcher<T>(client: Arc<Client>, resource: Resource) -> FetchFn<T>
where
    T: DeserializeOwned + Clone + Send + 'static,
{
    fetch_fn(move |params: WireQueryParams| {
        let client = Arc::clone(&client);
        async move { client.get_list::<T>(resource.path(), &params).await }
    })
}

/// A server-side controller for `resource`.
pub fn resource_table<T>(
    client: Arc<Client>,
    cache: Arc<QueryCache<TableResponse<T>>>,
    resource: Resource,
) -> TableDataController<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    TableDataController::new(
        resource.namespace(),
        cache,
        resource_fetcher(client, resource),
    )
}

/// Uploads a file to `/documents` as multipart form data.
///
/// The file goes in the `file` part; `fields` become plain text parts.
pub async fn upload_document(
    client: &Client,
    file_path: &Path,
    fields: &[(String, String)],
) -> Result<Value, ProjectDeskError> {
    let bytes = tokio::fs::read(file_path).await?;
    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ProjectDeskError::InvalidInput(format!("not a file: {}", file_path.display()))
        })?;

    let mut form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.clone()));
    for (key, value) in fields {
        form = form.text(key.clone(), value.clone());
    }

    tracing::info!("Uploading {}", file_name);
    let resp = client
        .upload::<Value>(Resource::Documents.path(), form)
        .await?;
    Ok(resp.data)
}
