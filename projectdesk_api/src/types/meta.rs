use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::FieldErrors;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A JSON response body, classified once at the transport boundary.
///
/// Any JSON object carrying a boolean `success` is an envelope; everything
/// else (bare arrays, legacy `{data, pagination}` objects, scalars) is bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Enveloped(Envelope),
    Bare(Value),
}

/// The backend's `{ success, data, message?, errors?, pagination? }` wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub success: bool,
    /// Missing `data` deserializes to `Value::Null`.
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    message: Value,
    #[serde(default)]
    errors: Value,
    #[serde(default)]
    pagination: Value,
}

impl Envelope {
    pub fn message(&self) -> Option<String> {
        message_of(&self.message)
    }

    pub fn errors(&self) -> FieldErrors {
        field_errors_of(&self.errors)
    }

    pub fn pagination(&self) -> Option<RawPagination> {
        RawPagination::from_value(&self.pagination)
    }
}

/// Reads a `message` value, ignoring anything that isn't a non-empty string.
pub(crate) fn message_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Reads an `errors` map. Single strings are accepted as one-element lists.
pub(crate) fn field_errors_of(value: &Value) -> FieldErrors {
    let Value::Object(map) = value else {
        return FieldErrors::new();
    };
    map.iter()
        .filter_map(|(field, msgs)| {
            let msgs: Vec<String> = match msgs {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => items
                    .iter()
                    .filter_map(|m| m.as_str().map(str::to_string))
                    .collect(),
                _ => return None,
            };
            Some((field.clone(), msgs))
        })
        .collect()
}

/// Pagination metadata exactly as the backend sent it.
///
/// Endpoints disagree on field names (`page`/`pageSize`/`totalPages` versus
/// `current_page`/`per_page`/`last_page`), and some send numbers as strings,
/// so fields are read leniently by accessor instead of by a fixed schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPagination(Map<String, Value>);

impl RawPagination {
    /// Returns `None` unless `value` is a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map.clone())),
            _ => None,
        }
    }

    fn field(&self, names: &[&str]) -> Option<u64> {
        names
            .iter()
            .find_map(|name| self.0.get(*name).and_then(lenient_u64))
    }

    pub fn total(&self) -> Option<u64> {
        self.field(&["total", "totalCount", "total_count", "totalItems"])
    }

    pub fn page(&self) -> Option<u64> {
        self.field(&["page", "current_page", "currentPage"])
    }

    pub fn page_size(&self) -> Option<u64> {
        self.field(&["pageSize", "per_page", "perPage", "page_size"])
    }

    pub fn total_pages(&self) -> Option<u64> {
        self.field(&["totalPages", "last_page", "lastPage", "total_pages"])
    }
}

fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn clamp_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Normalized pagination: every field is always a finite, usable number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    /// 1-based, within `[1, max(total_pages, 1)]`.
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl Default for PageMeta {
    fn default() -> Self {
        PageMeta {
            total: 0,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            total_pages: 0,
        }
    }
}

impl PageMeta {
    /// Fills every missing or unusable field with its default.
    ///
    /// `total_pages` falls back to `ceil(total / page_size)`, which is 0
    /// when `total` is also missing.
    pub fn resolve(raw: &RawPagination) -> Self {
        let total = raw.total().unwrap_or(0);
        let page_size = raw
            .page_size()
            .filter(|size| *size > 0)
            .map(clamp_u32)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let total_pages = raw
            .total_pages()
            .map(clamp_u32)
            .unwrap_or_else(|| clamp_u32(total.div_ceil(u64::from(page_size))));
        let page = raw
            .page()
            .map(clamp_u32)
            .unwrap_or(DEFAULT_PAGE)
            .clamp(1, total_pages.max(1));
        PageMeta {
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

/// A normalized JSON response: the envelope's `data` plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub message: Option<String>,
    pub pagination: Option<RawPagination>,
}

impl<T> ApiResponse<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            message: self.message,
            pagination: self.pagination,
        }
    }
}

impl From<ResponseBody> for ApiResponse<Value> {
    fn from(body: ResponseBody) -> Self {
        match body {
            ResponseBody::Enveloped(envelope) => ApiResponse {
                message: envelope.message(),
                pagination: envelope.pagination(),
                data: envelope.data,
            },
            ResponseBody::Bare(data) => ApiResponse {
                data,
                message: None,
                pagination: None,
            },
        }
    }
}

/// The only list shape screens consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResponse<T> {
    pub data: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> TableResponse<T> {
    pub fn new(data: Vec<T>, meta: PageMeta) -> Self {
        TableResponse {
            data,
            total_count: meta.total,
            page: meta.page,
            page_size: meta.page_size,
            total_pages: meta.total_pages,
        }
    }

    pub fn meta(&self) -> PageMeta {
        PageMeta {
            total: self.total_count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

impl<T> Default for TableResponse<T> {
    fn default() -> Self {
        TableResponse::new(Vec::new(), PageMeta::default())
    }
}
