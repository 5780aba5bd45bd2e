//! UI-level table state and its wire-format encoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;
use url::Url;

use crate::types::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};

use super::common::{Query, SortOrder};

/// One entry of the table's sort state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub id: String,
    pub desc: bool,
}

impl SortDescriptor {
    pub fn asc(id: &str) -> Self {
        Self {
            id: id.to_string(),
            desc: false,
        }
    }

    pub fn desc(id: &str) -> Self {
        Self {
            id: id.to_string(),
            desc: true,
        }
    }
}

/// One column filter. `value` is whatever the filter widget produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub id: String,
    pub value: Value,
}

impl ColumnFilter {
    pub fn new(id: &str, value: impl Into<Value>) -> Self {
        Self {
            id: id.to_string(),
            value: value.into(),
        }
    }
}

/// The pagination slice of table state. `page_index` is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page_index: u32,
    pub page_size: u32,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Table state as the UI sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableQueryOptions {
    /// 0-based.
    pub page_index: u32,
    pub page_size: u32,
    pub sorting: Vec<SortDescriptor>,
    pub column_filters: Vec<ColumnFilter>,
    /// Passed through untouched; trimming is the caller's job.
    pub search: String,
}

impl Default for TableQueryOptions {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sorting: Vec::new(),
            column_filters: Vec::new(),
            search: String::new(),
        }
    }
}

impl TableQueryOptions {
    pub fn with_page_index(mut self, page_index: u32) -> Self {
        self.page_index = page_index;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_sort(mut self, sort: SortDescriptor) -> Self {
        self.sorting.push(sort);
        self
    }

    pub fn with_filter(mut self, id: &str, value: impl Into<Value>) -> Self {
        self.column_filters.push(ColumnFilter::new(id, value));
        self
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = search.to_string();
        self
    }

    pub fn pagination(&self) -> PaginationState {
        PaginationState {
            page_index: self.page_index,
            page_size: self.page_size,
        }
    }
}

/// The flat query the backend receives. Derived, never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireQueryParams {
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl Default for WireQueryParams {
    fn default() -> Self {
        encode(&TableQueryOptions::default())
    }
}

/// Maps table state to wire parameters.
///
/// Only the first sort descriptor is sent. Filters whose value is null or
/// empty are dropped rather than sent as empty strings.
pub fn encode(options: &TableQueryOptions) -> WireQueryParams {
    let sort = options.sorting.first();
    WireQueryParams {
        page: options.page_index.saturating_add(1),
        page_size: options.page_size,
        sort_by: sort.map(|s| s.id.clone()),
        sort_order: sort.map(|s| SortOrder::from_desc(s.desc)),
        search: Some(options.search.clone()).filter(|s| !s.is_empty()),
        filters: options
            .column_filters
            .iter()
            .filter_map(|f| filter_value(&f.value).map(|v| (f.id.clone(), v)))
            .collect(),
    }
}

fn filter_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(filter_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    };
    Some(text).filter(|t| !t.is_empty())
}

impl From<&TableQueryOptions> for WireQueryParams {
    fn from(options: &TableQueryOptions) -> Self {
        encode(options)
    }
}

impl Query for WireQueryParams {
    fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy".to_string(), sort_by.clone()));
        }
        if let Some(sort_order) = self.sort_order {
            pairs.push(("sortOrder".to_string(), sort_order.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        for (key, value) in self.filters.iter() {
            pairs.push((format!("filters[{}]", key), value.clone()));
        }
        pairs
    }
}

impl WireQueryParams {
    /// Reads parameters back out of a URL built by [`Query::add_to_url`].
    pub fn from_url(url: &Url) -> Self {
        let mut params = WireQueryParams {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: None,
            sort_order: None,
            search: None,
            filters: BTreeMap::new(),
        };
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "page" => params.page = value.parse().unwrap_or(DEFAULT_PAGE),
                "pageSize" => params.page_size = value.parse().unwrap_or(DEFAULT_PAGE_SIZE),
                "sortBy" => params.sort_by = Some(value.into_owned()),
                "sortOrder" => params.sort_order = value.parse().ok(),
                "search" => params.search = Some(value.into_owned()),
                other => {
                    if let Some(field) = other
                        .strip_prefix("filters[")
                        .and_then(|rest| rest.strip_suffix(']'))
                    {
                        params.filters.insert(field.to_string(), value.into_owned());
                    }
                }
            }
        }
        params
    }
}

/// Cache identity of one list request: a namespace plus encoded parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub namespace: String,
    pub params: WireQueryParams,
}

impl QueryKey {
    pub fn new(namespace: &str, params: WireQueryParams) -> Self {
        Self {
            namespace: namespace.to_string(),
            params,
        }
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.to_query_pairs())
            .finish();
        write!(f, "{}?{}", self.namespace, query)
    }
}
