mod common;
pub use self::common::{Query, SortOrder};

mod table;
pub use self::table::{
    encode, ColumnFilter, PaginationState, QueryKey, SortDescriptor, TableQueryOptions,
    WireQueryParams,
};

mod response;
pub use self::response::{decode, RawList};
