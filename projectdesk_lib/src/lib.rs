//! Library layer for ProjectDesk: query cache, table controllers, period
//! checks and credential persistence on top of `projectdesk_api`.

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod period;
pub mod resource;
pub mod store;

pub use projectdesk_api;
pub use projectdesk_api::types;
pub use projectdesk_api::{
    encode, ColumnFilter, Error, PaginationState, SortDescriptor, SortOrder, TableQueryOptions,
    WireQueryParams,
};

pub use cache::QueryCache;
pub use config::{CacheConfig, ClientConfig};
pub use controller::{fetch_fn, FetchFn, LoadOutcome, TableDataController, TableView};
pub use error::ProjectDeskError;
pub use period::{Period, PeriodGate, PeriodStatus, PeriodType};
pub use resource::{resource_fetcher, resource_table, upload_document, Resource};
pub use store::FileCredentialStore;
