//! Offset pagination with opaque page tokens.
//!
//! A page token is the decimal-string encoding of the next offset. Clients must
//! treat it as opaque; an empty token means offset 0.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Default page size for most aggregates.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Default page size for accounts and the ledger view.
pub const LARGE_PAGE_SIZE: u64 = 100;

/// Upper bound on any single page.
pub const MAX_PAGE_SIZE: u64 = 1000;

/// Largest offset the store accepts (a signed 64-bit `OFFSET`).
pub const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Page descriptor as carried on requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Requested page size; `<= 0` means the server default.
    #[serde(default)]
    pub page_size: i32,
    /// Opaque token from a previous response; empty means the first page.
    #[serde(default)]
    pub page_token: String,
}

impl PageRequest {
    /// Creates a page request.
    #[must_use]
    pub fn new(page_size: i32, page_token: impl Into<String>) -> Self {
        Self {
            page_size,
            page_token: page_token.into(),
        }
    }

    /// Resolves the request into a concrete `limit`/`offset` window.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the token is not a non-negative integer.
    pub fn resolve(&self, default_size: u64) -> AppResult<Page> {
        let limit = match u64::try_from(self.page_size) {
            Ok(0) | Err(_) => default_size,
            Ok(size) => size.min(MAX_PAGE_SIZE),
        };
        Ok(Page {
            limit,
            offset: decode_page_token(&self.page_token)?,
        })
    }
}

/// A resolved `limit`/`offset` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Maximum number of rows to return.
    pub limit: u64,
    /// Number of rows to skip.
    pub offset: u64,
}

impl Page {
    /// Creates a window, applying the default size when `limit` is zero.
    #[must_use]
    pub fn new(limit: u64, offset: u64, default_size: u64) -> Self {
        let limit = if limit == 0 {
            default_size
        } else {
            limit.min(MAX_PAGE_SIZE)
        };
        Self { limit, offset }
    }

    /// Token for the page after this one, or empty when `total` is exhausted.
    #[must_use]
    pub fn next_token(&self, returned: usize, total: u64) -> String {
        let next = self.offset + returned as u64;
        if returned == 0 || next >= total {
            String::new()
        } else {
            encode_page_token(next)
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// Encodes an offset as a page token.
#[must_use]
pub fn encode_page_token(offset: u64) -> String {
    offset.to_string()
}

/// Decodes a page token into an offset.
///
/// # Errors
///
/// Returns `InvalidArgument` for anything but an empty string or a
/// non-negative decimal integer.
pub fn decode_page_token(token: &str) -> AppResult<u64> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(0);
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidArgument(format!(
            "page_token '{token}' is not a non-negative integer"
        )));
    }
    token
        .parse::<u64>()
        .ok()
        .filter(|offset| *offset <= MAX_OFFSET)
        .ok_or_else(|| AppError::InvalidArgument(format!("page_token '{token}' is out of range")))
}

/// Checks an explicit `offset` query value.
///
/// # Errors
///
/// Returns `InvalidArgument` above [`MAX_OFFSET`].
pub fn check_offset(offset: u64) -> AppResult<u64> {
    if offset > MAX_OFFSET {
        return Err(AppError::InvalidArgument(format!("offset {offset} is out of range")));
    }
    Ok(offset)
}

/// A page of results with continuation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub items: Vec<T>,
    /// Token for the next page; empty when there are no more rows.
    pub next_page_token: String,
    /// Total number of rows matching the query across all pages.
    pub total_size: i64,
}

impl<T> PageResponse<T> {
    /// Builds a response for `items` fetched with `page` out of `total` rows.
    #[must_use]
    pub fn new(items: Vec<T>, page: Page, total: u64) -> Self {
        let next_page_token = page.next_token(items.len(), total);
        Self {
            items,
            next_page_token,
            total_size: i64::try_from(total).unwrap_or(i64::MAX),
        }
    }

    /// Converts every item, keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            next_page_token: self.next_page_token,
            total_size: self.total_size,
        }
    }
}
