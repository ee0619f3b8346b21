//! Authentication schemes and credential handling.
//!
//! The v4 API accepts three kinds of credentials:
//!
//! - a global API key plus the account email (`X-Auth-Key`, `X-Auth-Email`)
//! - a scoped API token (`Authorization: Bearer ...`)
//! - an origin CA user service key (`X-Auth-User-Service-Key`)
//!
//! A client may hold any combination in [`Credentials`]. An [`AuthMask`]
//! decides which of them go out on a given request.
//!
//! # Example
//!
//! ```rust
//! use cloudflare_api::{ApiToken, AuthMask, Credentials, UserServiceKey};
//!
//! let credentials = Credentials::new()
//!     .with_token(ApiToken::new("token").unwrap())
//!     .with_user_service_key(UserServiceKey::new("v1.0-key").unwrap());
//!
//! assert_eq!(credentials.default_mask(), AuthMask::TOKEN);
//! assert!(credentials.available().contains(AuthMask::USER_SERVICE_KEY));
//! ```

pub(crate) mod credentials;
mod mask;

pub use credentials::{Credentials, REDACTED, X_AUTH_EMAIL, X_AUTH_KEY, X_AUTH_USER_SERVICE_KEY};
pub use mask::AuthMask;
