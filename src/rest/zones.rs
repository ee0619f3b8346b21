//! Zone listing and name-to-id resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clients::context::Context;
use crate::clients::errors::{Error, ErrorDetails};
use crate::clients::http_client::Client;
use crate::rest::envelope::ResultInfo;
use crate::rest::pagination::{ListParams, PaginationOptions};

/// Message returned when a zone name matches more than one zone.
pub const ERR_AMBIGUOUS_ZONE: &str = "ambiguous zone name; an account ID might help";

/// Message returned when a zone name matches nothing.
pub const ERR_ZONE_NOT_FOUND: &str = "zone could not be found";

/// Page size used when listing zones.
pub const DEFAULT_ZONES_PER_PAGE: u32 = 50;

/// The account that owns a zone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAccount {
    /// Account identifier.
    #[serde(default)]
    pub id: String,
    /// Account name.
    #[serde(default)]
    pub name: String,
}

/// The fields of a zone needed to identify it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSummary {
    /// Zone identifier.
    pub id: String,
    /// Domain name, e.g. `example.com`.
    pub name: String,
    /// Lifecycle status, e.g. `active` or `pending`.
    #[serde(default)]
    pub status: String,
    /// Whether the zone is paused.
    #[serde(default)]
    pub paused: bool,
    /// Owning account.
    #[serde(default)]
    pub account: ZoneAccount,
    /// When the zone was created.
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    /// When the zone was last modified.
    #[serde(default)]
    pub modified_on: Option<DateTime<Utc>>,
}

/// Filters for [`Client::list_zones`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ZoneListParams {
    /// Exact domain name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Restrict to one account.
    #[serde(rename = "account.id", skip_serializing_if = "String::is_empty")]
    pub account_id: String,
    /// Restrict to one status.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    /// Page selection.
    #[serde(flatten)]
    pub pagination: PaginationOptions,
}

impl ListParams for ZoneListParams {
    fn pagination(&self) -> &PaginationOptions {
        &self.pagination
    }

    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        &mut self.pagination
    }
}

impl Client {
    /// Lists zones matching `params`, following every page.
    ///
    /// # Errors
    ///
    /// Returns the first failing page's error.
    pub async fn list_zones(
        &self,
        ctx: &Context,
        params: &ZoneListParams,
    ) -> Result<(Vec<ZoneSummary>, ResultInfo), Error> {
        self.paginate(ctx, "/zones", params, DEFAULT_ZONES_PER_PAGE)
            .await
            .map_err(|e| e.with_operation("list zones"))
    }

    /// Resolves a zone name to its identifier.
    ///
    /// # Errors
    ///
    /// - Not found error with status 0 if no zone has that name
    /// - Request error with status 0 if several zones share it; use
    ///   [`zone_id_by_name_in_account`](Self::zone_id_by_name_in_account)
    /// - Whatever error the listing call returns
    pub async fn zone_id_by_name(&self, ctx: &Context, name: &str) -> Result<String, Error> {
        self.resolve_zone(ctx, name, "").await
    }

    /// Resolves a zone name to its identifier within one account.
    ///
    /// # Errors
    ///
    /// Same as [`zone_id_by_name`](Self::zone_id_by_name).
    pub async fn zone_id_by_name_in_account(
        &self,
        ctx: &Context,
        name: &str,
        account_id: &str,
    ) -> Result<String, Error> {
        self.resolve_zone(ctx, name, account_id).await
    }

    async fn resolve_zone(&self, ctx: &Context, name: &str, account_id: &str) -> Result<String, Error> {
        let params = ZoneListParams {
            name: normalize_zone_name(name),
            account_id: account_id.to_string(),
            ..ZoneListParams::default()
        };
        let (zones, _) = self.list_zones(ctx, &params).await?;

        match zones.as_slice() {
            [zone] => Ok(zone.id.clone()),
            [] => Err(Error::NotFound(ErrorDetails::from_message(0, None, ERR_ZONE_NOT_FOUND))),
            _ => {
                tracing::debug!(name, matches = zones.len(), "zone name is ambiguous");
                Err(Error::invalid_request(ERR_AMBIGUOUS_ZONE))
            }
        }
    }
}

/// Lower-cases a zone name and drops a trailing dot.
fn normalize_zone_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}
