mod meta;
pub use self::meta::{
    ApiResponse, Envelope, PageMeta, RawPagination, ResponseBody, TableResponse, DEFAULT_PAGE,
    DEFAULT_PAGE_SIZE,
};
pub(crate) use self::meta::{field_errors_of, message_of};

mod auth;
pub use self::auth::{Credentials, Session};
