//! Request extractors.

use std::convert::Infallible;

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use ledgerline_shared::types::pagination::check_offset;
use ledgerline_shared::types::{Page, PageRequest};
use ledgerline_shared::{AppResult, RequestContext};
use serde::Deserialize;

use crate::error::ApiError;

/// JSON body whose rejection is reported as `INVALID_ARGUMENT`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters whose rejection is reported as `INVALID_ARGUMENT`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string whose rejection is reported as `INVALID_ARGUMENT`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// The request context installed by
/// [`request_context`](crate::middleware::request_context).
///
/// Falls back to an anonymous context without deadline when the middleware
/// did not run.
#[derive(Debug, Clone)]
pub struct Ctx(pub RequestContext);

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<RequestContext>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}

/// Paging query parameters.
///
/// Accepts either the token form (`page_size`, `page_token`) or the
/// `limit`/`offset` form. The token form wins when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    /// Maximum rows; 0 or absent means the default.
    pub limit: Option<u64>,
    /// Rows to skip.
    pub offset: Option<u64>,
    /// Requested page size; `<= 0` means the default.
    pub page_size: Option<i32>,
    /// Opaque token from a previous response.
    pub page_token: Option<String>,
}

impl PageParams {
    /// Resolves the parameters into a window of at most `default_size` rows
    /// when no size is given.
    pub fn resolve(&self, default_size: u64) -> AppResult<Page> {
        if self.page_size.is_some() || self.page_token.is_some() {
            return PageRequest::new(
                self.page_size.unwrap_or_default(),
                self.page_token.clone().unwrap_or_default(),
            )
            .resolve(default_size);
        }
        Ok(Page::new(
            self.limit.unwrap_or_default(),
            check_offset(self.offset.unwrap_or_default())?,
            default_size,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerline_shared::AppError;
    use ledgerline_shared::types::pagination::encode_page_token;

    #[test]
    fn test_limit_offset_form() {
        let params = PageParams {
            limit: Some(20),
            offset: Some(40),
            ..PageParams::default()
        };
        assert_eq!(
            params.resolve(50).unwrap(),
            Page {
                limit: 20,
                offset: 40
            }
        );
    }

    #[test]
    fn test_defaults_when_empty() {
        assert_eq!(
            PageParams::default().resolve(100).unwrap(),
            Page {
                limit: 100,
                offset: 0
            }
        );
    }

    #[test]
    fn test_token_form_wins() {
        let params = PageParams {
            limit: Some(5),
            offset: Some(5),
            page_size: Some(10),
            page_token: Some(encode_page_token(30)),
        };
        assert_eq!(
            params.resolve(50).unwrap(),
            Page {
                limit: 10,
                offset: 30
            }
        );
    }

    #[test]
    fn test_bad_token_is_invalid_argument() {
        let params = PageParams {
            page_token: Some("abc".to_string()),
            ..PageParams::default()
        };
        assert!(matches!(params.resolve(50), Err(AppError::InvalidArgument(_))));
    }
}
