//! The auth mask bitset.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Selects which authentication schemes are attached to a request.
///
/// The mask is a bitset so that endpoints needing more than one scheme can
/// ask for all of them on a single request.
///
/// # Example
///
/// ```rust
/// use cloudflare_api::AuthMask;
///
/// let both = AuthMask::KEY_EMAIL | AuthMask::USER_SERVICE_KEY;
/// assert!(both.contains(AuthMask::KEY_EMAIL));
/// assert!(!both.contains(AuthMask::TOKEN));
/// assert_eq!(both.to_string(), "KEY_EMAIL | USER_SERVICE_KEY");
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AuthMask(u8);

impl AuthMask {
    /// No authentication headers.
    pub const NONE: Self = Self(0);
    /// `X-Auth-Key` and `X-Auth-Email`.
    pub const KEY_EMAIL: Self = Self(1);
    /// `X-Auth-User-Service-Key`.
    pub const USER_SERVICE_KEY: Self = Self(1 << 1);
    /// `Authorization: Bearer <token>`.
    pub const TOKEN: Self = Self(1 << 2);

    const ALL: u8 = 0b111;

    /// Builds a mask from raw bits, dropping unknown bits.
    #[must_use]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if no scheme is selected.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every scheme in `other` is also selected here.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of both masks.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns the schemes selected here but not in `other`.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for AuthMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for AuthMask {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Display for AuthMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let names = [
            (Self::KEY_EMAIL, "KEY_EMAIL"),
            (Self::USER_SERVICE_KEY, "USER_SERVICE_KEY"),
            (Self::TOKEN, "TOKEN"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for AuthMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthMask({self})")
    }
}
