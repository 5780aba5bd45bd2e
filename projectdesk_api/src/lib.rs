//! Transport client and table-query codec for the project-management backend.

mod client;
mod errors;
pub mod query;
pub mod session;
pub mod types;
pub use self::client::{Client, ClientConfig, RequestBody};
pub use self::errors::{ApiError, Error, FieldErrors, DEFAULT_ERROR_MESSAGE, NETWORK_ERROR_MESSAGE};
pub use self::query::{
    decode, encode, ColumnFilter, PaginationState, Query, QueryKey, RawList, SortDescriptor,
    SortOrder, TableQueryOptions, WireQueryParams,
};
pub use self::session::{CredentialStore, MemoryCredentialStore, MemoryNavigator, Navigator};
pub use reqwest::multipart;
pub use reqwest::Method;
