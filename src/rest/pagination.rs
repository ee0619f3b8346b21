//! Auto-pagination for list endpoints.
//!
//! List endpoints accept `page`, `per_page` and sometimes `cursor` query
//! parameters and answer with a [`ResultInfo`]. [`Client::paginate`] walks
//! every page unless the caller pinned a page, in which case exactly one
//! request is made.
//!
//! # Example
//!
//! ```rust,ignore
//! use cloudflare_api::rest::{PaginationOptions, ResourceScope};
//!
//! let path = ResourceScope::zone(zone_id).path("dns_records")?;
//! let (records, info): (Vec<serde_json::Value>, _) = client
//!     .paginate(&ctx, &path, &PaginationOptions::default(), 100)
//!     .await?;
//! println!("{} of {} records", records.len(), info.total);
//! ```

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::clients::context::Context;
use crate::clients::errors::{Error, ERR_UNMARSHAL_BODY};
use crate::clients::http_client::Client;
use crate::clients::http_request::HttpMethod;
use crate::rest::envelope::{Envelope, ResultInfo};
use crate::rest::path::build_uri;

/// Page selection shared by every list call.
///
/// Zero and empty values are left out of the query string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PaginationOptions {
    /// Page to fetch, starting at 1.
    #[serde(skip_serializing_if = "is_zero")]
    pub page: u32,
    /// Items per page.
    #[serde(skip_serializing_if = "is_zero")]
    pub per_page: u32,
    /// Opaque cursor for cursor-based endpoints.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cursor: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl PaginationOptions {
    /// Options pinned to a single page.
    #[must_use]
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            cursor: String::new(),
        }
    }

    /// Returns `true` if the caller asked for a specific page or page size.
    #[must_use]
    pub const fn is_explicit(&self) -> bool {
        self.page >= 1 || self.per_page >= 1
    }
}

/// Query parameters of a list endpoint that embed [`PaginationOptions`].
///
/// Flatten the options into the parameter struct with
/// `#[serde(flatten)]` and point these accessors at that field.
pub trait ListParams: Serialize + Clone {
    /// Returns the embedded pagination options.
    fn pagination(&self) -> &PaginationOptions;

    /// Returns the embedded pagination options for modification.
    fn pagination_mut(&mut self) -> &mut PaginationOptions;
}

impl ListParams for PaginationOptions {
    fn pagination(&self) -> &PaginationOptions {
        self
    }

    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        self
    }
}

impl Client {
    /// Lists every item at `path`, following pages or cursors.
    ///
    /// If `params` pins a page or page size, only that page is fetched.
    /// Otherwise the listing starts at page 1 with `default_per_page` and
    /// continues while a next cursor is present or more pages remain.
    /// The returned [`ResultInfo`] is that of the last page fetched.
    ///
    /// # Errors
    ///
    /// Returns the first failing page's error. Items already fetched are
    /// discarded.
    pub async fn paginate<T, P>(
        &self,
        ctx: &Context,
        path: &str,
        params: &P,
        default_per_page: u32,
    ) -> Result<(Vec<T>, ResultInfo), Error>
    where
        T: DeserializeOwned,
        P: ListParams,
    {
        let mut params = params.clone();
        let auto = !params.pagination().is_explicit();
        if auto {
            let options = params.pagination_mut();
            options.page = 1;
            options.per_page = default_per_page;
        }

        let mut items = Vec::new();
        loop {
            let uri = build_uri(path, &params)?;
            let response = self
                .execute_complete(ctx, HttpMethod::Get, &uri, None, HeaderMap::new())
                .await?;
            let envelope: Envelope<Option<Vec<T>>> = serde_json::from_slice(&response.body)
                .map_err(|e| {
                    Error::transport_with_status(
                        response.status,
                        response.trace_id().map(String::from),
                        ERR_UNMARSHAL_BODY,
                        e,
                    )
                })?;
            items.extend(envelope.result.unwrap_or_default());
            let info = envelope.result_info.unwrap_or_default();

            if !auto {
                return Ok((items, info));
            }

            let options = params.pagination_mut();
            if !info.cursors.after.is_empty() {
                if info.cursors.after == options.cursor {
                    tracing::warn!(path, cursor = %options.cursor, "cursor did not advance, stopping");
                    return Ok((items, info));
                }
                options.cursor = info.cursors.after.clone();
                continue;
            }
            if info.is_done() {
                return Ok((items, info));
            }
            let next = info.next().page;
            if next <= options.page {
                tracing::warn!(path, page = options.page, "page did not advance, stopping");
                return Ok((items, info));
            }
            options.page = next;
        }
    }
}

/// Checks that a single-page response is consistent with the request.
///
/// Returns `false` when the server answered with a different page or page
/// size than asked for, or when the item count does not fit the totals: a
/// page before the last must be full, and the last page holds the remainder
/// `total - per_page * (total_pages - 1)`.
///
/// # Panics
///
/// Panics if `info` carries cursors; cursor listings are not checked.
#[must_use]
pub fn check_result_info(per_page: u32, page: u32, count: u32, info: &ResultInfo) -> bool {
    if !info.cursor.is_empty() || !info.cursors.before.is_empty() || !info.cursors.after.is_empty() {
        panic!("unimplemented for cursors");
    }
    if info.per_page != per_page || info.page != page || info.count != count {
        return false;
    }
    if info.total_pages == 0 {
        return count <= per_page;
    }
    if page > info.total_pages {
        return false;
    }
    if page < info.total_pages {
        return count == per_page;
    }
    let before_last = per_page.saturating_mul(info.total_pages - 1);
    count == info.total.saturating_sub(before_last)
}
