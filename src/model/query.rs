//! Wire shapes for the launches query endpoint.
//!
//! Request: `{query: {date_utc?: {$gt}}, options: {page, limit, sort, populate}}`.
//! Response: `{docs: [...], hasNextPage}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single page request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub query: LaunchFilter,
    pub options: QueryOptions,
}

/// Server-side filter. Empty means every launch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaunchFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_utc: Option<DateAfter>,
}

/// `{"$gt": <RFC 3339 instant>}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateAfter {
    #[serde(rename = "$gt")]
    pub gt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOptions {
    /// 1-based.
    pub page: u32,
    pub limit: u32,
    pub sort: SortSpec,
    pub populate: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortSpec {
    pub flight_number: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
}

/// One page of results. Documents stay untyped until validated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub docs: Vec<Value>,

    #[serde(default, rename = "hasNextPage")]
    pub has_next_page: bool,
}
