use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::DigestOptions;

/// One day, the library default for `expires_in`.
pub const DEFAULT_EXPIRES_IN: Duration = Duration::from_secs(24 * 60 * 60);

/// How long a store should keep an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expiration {
    Never,
    After(#[serde(with = "humantime_serde")] Duration),
}

impl Expiration {
    pub fn as_duration(self) -> Option<Duration> {
        match self {
            Expiration::Never => None,
            Expiration::After(ttl) => Some(ttl),
        }
    }
}

impl From<Duration> for Expiration {
    fn from(ttl: Duration) -> Self {
        Expiration::After(ttl)
    }
}

/// The options a store receives with every `fetch`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    pub expires_in: Expiration,
}

/// Caching options attached to a method.
///
/// Every field is optional so that layers can be merged: per-call options
/// override per-class defaults, which override [`CachingOptions::library_defaults`].
/// A field left as `None` after merging falls back to `false` (or
/// [`Expiration::Never`] for `expires_in`).
///
/// # Examples
///
/// ```
/// use cachette_core::{CachingOptions, Expiration};
/// use std::time::Duration;
///
/// let class_defaults = CachingOptions::new().no_sha(true);
/// let per_call = CachingOptions::new().expires_in(Duration::from_secs(60));
///
/// let effective = per_call
///     .merged_over(&class_defaults)
///     .merged_over(&CachingOptions::library_defaults());
///
/// assert_eq!(effective.store_options().expires_in, Expiration::After(Duration::from_secs(60)));
/// assert!(effective.digest_options().no_sha);
/// assert!(effective.digest_options().no_locale);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachingOptions {
    pub expires_in: Option<Expiration>,
    pub no_version: Option<bool>,
    pub no_locale: Option<bool>,
    pub no_sha: Option<bool>,
}

impl CachingOptions {
    /// An empty record; every field is inherited when merged.
    pub fn new() -> Self {
        Self::default()
    }

    /// `expires_in = 1 day`, locale left out of the key, version and SHA-1 on.
    pub fn library_defaults() -> Self {
        Self {
            expires_in: Some(Expiration::After(DEFAULT_EXPIRES_IN)),
            no_version: Some(false),
            no_locale: Some(true),
            no_sha: Some(false),
        }
    }

    pub fn expires_in(mut self, expires_in: impl Into<Expiration>) -> Self {
        self.expires_in = Some(expires_in.into());
        self
    }

    pub fn never_expires(mut self) -> Self {
        self.expires_in = Some(Expiration::Never);
        self
    }

    pub fn no_version(mut self, value: bool) -> Self {
        self.no_version = Some(value);
        self
    }

    pub fn no_locale(mut self, value: bool) -> Self {
        self.no_locale = Some(value);
        self
    }

    pub fn no_sha(mut self, value: bool) -> Self {
        self.no_sha = Some(value);
        self
    }

    /// Returns `self` with unset fields taken from `base`. Fields set on
    /// `self` win.
    pub fn merged_over(self, base: &CachingOptions) -> CachingOptions {
        CachingOptions {
            expires_in: self.expires_in.or(base.expires_in),
            no_version: self.no_version.or(base.no_version),
            no_locale: self.no_locale.or(base.no_locale),
            no_sha: self.no_sha.or(base.no_sha),
        }
    }

    pub fn digest_options(&self) -> DigestOptions {
        DigestOptions {
            no_version: self.no_version.unwrap_or(false),
            no_locale: self.no_locale.unwrap_or(false),
            no_sha: self.no_sha.unwrap_or(false),
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            expires_in: self.expires_in.unwrap_or(Expiration::Never),
        }
    }
}
