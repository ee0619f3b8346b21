//! The REST surface shared by every resource: envelopes, scopes, query
//! strings and pagination.
//!
//! # Key Types
//!
//! - [`Envelope`], [`ResultInfo`], [`ResponseInfo`]: the standard response
//!   wrapper and its metadata
//! - [`ResourceScope`]: account, zone or user container for a path
//! - [`build_uri`]: path plus serialized query parameters
//! - [`PaginationOptions`] and [`ListParams`]: inputs to
//!   [`Client::paginate`](crate::Client::paginate)
//! - [`ZoneListParams`] and [`ZoneSummary`]: zone listing and lookup

pub(crate) mod envelope;
mod pagination;
mod path;
mod zones;

pub use envelope::{decode_envelope, Cursors, Envelope, RawEnvelope, ResponseInfo, ResponseInfoSource, ResultInfo};
pub use pagination::{check_result_info, ListParams, PaginationOptions};
pub use path::{
    build_uri, escape_path_segment, ResourceLevel, ResourceScope, ERR_MISSING_ACCOUNT_ID,
    ERR_MISSING_ZONE_ID,
};
pub use zones::{
    ZoneAccount, ZoneListParams, ZoneSummary, DEFAULT_ZONES_PER_PAGE, ERR_AMBIGUOUS_ZONE,
    ERR_ZONE_NOT_FOUND,
};
