//! Result envelopes returned by the list, count and item entry points

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Paginated list response
///
/// Serializes as `{ list, page, pageSize, pageCount, totalCount,
/// wasSuccessful, message }`. When counting was skipped both `totalCount`
/// and `pageCount` are `-1`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult<T> {
    pub list: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub page_count: i64,
    pub total_count: i64,
    pub was_successful: bool,
    pub message: Option<String>,

    /// Projection allowlist from the request, for the serializer downstream
    #[serde(skip)]
    pub fields: Vec<String>,
}

impl<T> ListResult<T> {
    /// Create a successful page; `total_count` is `None` when counting was skipped
    pub fn new(list: Vec<T>, page: i64, page_size: i64, total_count: Option<u64>) -> Self {
        // Ensure page_size is at least 1 to avoid division by zero
        let page_size = page_size.max(1);
        let (total_count, page_count) = match total_count {
            Some(total) => {
                let pages = total.div_ceil(page_size as u64);
                (
                    i64::try_from(total).unwrap_or(i64::MAX),
                    i64::try_from(pages).unwrap_or(i64::MAX),
                )
            }
            None => (-1, -1),
        };
        Self {
            list,
            page,
            page_size,
            page_count,
            total_count,
            was_successful: true,
            message: None,
            fields: Vec::new(),
        }
    }

    /// A failed list request carrying a human-readable message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            list: Vec::new(),
            page: 0,
            page_size: 0,
            page_count: 0,
            total_count: 0,
            was_successful: false,
            message: Some(message.into()),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }
}

impl<T: Serialize> IntoResponse for ListResult<T> {
    fn into_response(self) -> Response {
        let status = if self.was_successful {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        };
        (status, Json(self)).into_response()
    }
}

/// Single value response
///
/// Serializes as `{ object, wasSuccessful, message }`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult<T> {
    pub object: Option<T>,
    pub was_successful: bool,
    pub message: Option<String>,
}

impl<T> ItemResult<T> {
    pub fn success(object: T) -> Self {
        Self {
            object: Some(object),
            was_successful: true,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            object: None,
            was_successful: false,
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for ItemResult<T> {
    fn into_response(self) -> Response {
        let status = if self.was_successful {
            StatusCode::OK
        } else {
            StatusCode::NOT_FOUND
        };
        (status, Json(self)).into_response()
    }
}
