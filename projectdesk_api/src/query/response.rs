//! Normalizing list responses into [`TableResponse`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{PageMeta, RawPagination, TableResponse, DEFAULT_PAGE};
use crate::Error;

/// A list response before pagination is normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum RawList<T> {
    /// Server-side paginated: rows plus whatever pagination the server sent.
    Paged {
        data: Vec<T>,
        pagination: RawPagination,
    },
    /// A legacy endpoint that returns every row at once.
    Bare(Vec<T>),
}

impl<T: DeserializeOwned> RawList<T> {
    /// Builds a raw list from a normalized payload and optional sibling
    /// pagination metadata.
    ///
    /// Accepts a bare array, `null` (no rows), or an object holding `data`
    /// and `pagination`. Only rows that fail to deserialize are an error;
    /// pagination is never validated here.
    pub fn from_parts(data: Value, pagination: Option<RawPagination>) -> Result<Self, Error> {
        if let Some(pagination) = pagination {
            return Ok(RawList::Paged {
                data: rows(data)?,
                pagination,
            });
        }
        match data {
            Value::Object(mut obj) if obj.contains_key("data") => {
                let pagination = obj
                    .get("pagination")
                    .or_else(|| obj.get("meta"))
                    .and_then(RawPagination::from_value)
                    .unwrap_or_default();
                let data = obj.remove("data").unwrap_or(Value::Null);
                Ok(RawList::Paged {
                    data: rows(data)?,
                    pagination,
                })
            }
            Value::Object(_) => Err(Error::Decode("expected a list response".to_string())),
            other => Ok(RawList::Bare(rows(other)?)),
        }
    }
}

fn rows<T: DeserializeOwned>(data: Value) -> Result<Vec<T>, Error> {
    match data {
        Value::Null => Ok(Vec::new()),
        other => serde_json::from_value(other).map_err(|e| {
            tracing::error!("Failed to parse list rows: {}", e);
            Error::Decode(e.to_string())
        }),
    }
}

/// Normalizes a raw list into the table shape.
///
/// Never fails: missing or malformed pagination fields take their defaults
/// (see [`PageMeta::resolve`]). A bare list is a single page holding every row.
pub fn decode<T: Clone>(raw: &RawList<T>) -> TableResponse<T> {
    match raw {
        RawList::Paged { data, pagination } => {
            TableResponse::new(data.clone(), PageMeta::resolve(pagination))
        }
        RawList::Bare(data) => {
            let total = data.len() as u64;
            let meta = if data.is_empty() {
                PageMeta::default()
            } else {
                PageMeta {
                    total,
                    page: DEFAULT_PAGE,
                    page_size: u32::try_from(total).unwrap_or(u32::MAX),
                    total_pages: 1,
                }
            };
            TableResponse::new(data.clone(), meta)
        }
    }
}
