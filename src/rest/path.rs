//! Resource scopes and URI construction.
//!
//! Most endpoints live under one of three containers:
//!
//! - `/accounts/{account_id}/...`
//! - `/zones/{zone_id}/...`
//! - `/user/...`
//!
//! A [`ResourceScope`] names the container, and [`build_uri`] appends
//! serialized query parameters.
//!
//! # Example
//!
//! ```rust
//! use cloudflare_api::rest::{build_uri, ResourceScope};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Filter {
//!     #[serde(skip_serializing_if = "String::is_empty")]
//!     name: String,
//!     page: u32,
//! }
//!
//! let scope = ResourceScope::zone("023e105f4ecef8ad9ca31a8372d0c353");
//! let path = scope.path("dns_records").unwrap();
//! assert_eq!(path, "/zones/023e105f4ecef8ad9ca31a8372d0c353/dns_records");
//!
//! let uri = build_uri(&path, &Filter { name: String::new(), page: 2 }).unwrap();
//! assert_eq!(uri, "/zones/023e105f4ecef8ad9ca31a8372d0c353/dns_records?page=2");
//! ```

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::clients::errors::Error;

/// Message returned when an account scope has no identifier.
pub const ERR_MISSING_ACCOUNT_ID: &str = "required missing account ID";

/// Message returned when a zone scope has no identifier.
pub const ERR_MISSING_ZONE_ID: &str = "required missing zone ID";

/// The kind of container a resource lives under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceLevel {
    /// `/accounts/{id}`.
    Account,
    /// `/zones/{id}`.
    Zone,
    /// `/user`.
    User,
}

impl ResourceLevel {
    /// Returns the URL route segment for this level.
    #[must_use]
    pub const fn route(&self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::Zone => "zones",
            Self::User => "user",
        }
    }
}

impl fmt::Display for ResourceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Account => "account",
            Self::Zone => "zone",
            Self::User => "user",
        })
    }
}

/// A resource container: a level plus its identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceScope {
    level: ResourceLevel,
    identifier: String,
}

impl ResourceScope {
    /// An account-level scope.
    #[must_use]
    pub fn account(id: impl Into<String>) -> Self {
        Self {
            level: ResourceLevel::Account,
            identifier: id.into(),
        }
    }

    /// A zone-level scope.
    #[must_use]
    pub fn zone(id: impl Into<String>) -> Self {
        Self {
            level: ResourceLevel::Zone,
            identifier: id.into(),
        }
    }

    /// A user-level scope. The identifier is kept but never appears in URLs.
    #[must_use]
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            level: ResourceLevel::User,
            identifier: id.into(),
        }
    }

    /// Returns the scope's level.
    #[must_use]
    pub const fn level(&self) -> ResourceLevel {
        self.level
    }

    /// Returns the scope's identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the URL fragment, e.g. `accounts/abc` or `user`.
    #[must_use]
    pub fn url_fragment(&self) -> String {
        match self.level {
            ResourceLevel::User => ResourceLevel::User.route().to_string(),
            level => format!("{}/{}", level.route(), escape_path_segment(&self.identifier)),
        }
    }

    /// Builds the absolute API path for `subpath` under this scope.
    ///
    /// # Errors
    ///
    /// Returns a request error if an account or zone scope has an empty
    /// identifier.
    pub fn path(&self, subpath: &str) -> Result<String, Error> {
        if self.identifier.is_empty() {
            match self.level {
                ResourceLevel::Account => return Err(Error::invalid_request(ERR_MISSING_ACCOUNT_ID)),
                ResourceLevel::Zone => return Err(Error::invalid_request(ERR_MISSING_ZONE_ID)),
                ResourceLevel::User => {}
            }
        }

        let subpath = subpath.trim_start_matches('/');
        if subpath.is_empty() {
            Ok(format!("/{}", self.url_fragment()))
        } else {
            Ok(format!("/{}/{subpath}", self.url_fragment()))
        }
    }
}

impl fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url_fragment())
    }
}

/// Appends `params` to `path` as a query string.
///
/// Fields that serialize to nothing are omitted, so `Option::None` and
/// fields skipped via `skip_serializing_if` never appear. No `?` is added
/// when nothing remains.
///
/// # Errors
///
/// Returns a transport error if `params` is not a flat struct or map.
pub fn build_uri<P: Serialize + ?Sized>(path: &str, params: &P) -> Result<String, Error> {
    let query = serde_urlencoded::to_string(params)
        .map_err(|e| Error::transport("error encoding query parameters", e))?;
    if query.is_empty() {
        Ok(path.to_string())
    } else {
        Ok(format!("{path}?{query}"))
    }
}

/// Percent-encodes a value for use as a single path segment.
#[must_use]
pub fn escape_path_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::encode(segment)
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceLevel>();
    assert_send_sync::<ResourceScope>();
};
