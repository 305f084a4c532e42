//! Query utilities for NetBox API
//!
//! Provides helpers for building filtered list queries and handling pagination.

use crate::common::{HttpClient, PaginatedResponse};
use crate::error::NetBoxError;
use crate::models::Endpoint;
use serde::Deserialize;

/// Query a collection with optional filtering and pagination
pub async fn query_resources<T: for<'de> Deserialize<'de>>(
    http: &HttpClient,
    endpoint: Endpoint,
    filters: &[(&str, &str)],
    fetch_all: bool,
) -> Result<Vec<T>, NetBoxError> {
    let mut url = endpoint.list_path();

    if !filters.is_empty() {
        url = format!("{}?{}", url, http.build_query_string(filters));
    }

    if fetch_all {
        http.fetch_all_pages(http.build_url(&url)).await
    } else {
        let response: PaginatedResponse<T> = http.get(&url).await?;
        Ok(response.results)
    }
}

/// Render filters for log and error messages
pub fn describe_filters(filters: &[(&str, &str)]) -> String {
    let pairs = filters
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", pairs)
}
