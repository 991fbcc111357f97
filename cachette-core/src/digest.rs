//! # Key Digest
//!
//! Turns a [`CacheKey`] into the string used to address a cache entry.
//!
//! The pipeline is fixed:
//!
//! 1. normalize the key ([`CacheKey::normalize`])
//! 2. prefix `version:<V>:` unless `no_version`
//! 3. prefix `locale:<L>:` unless `no_locale`
//! 4. replace everything with its SHA-1 hex digest unless `no_sha`
//!
//! With every step enabled the hashed input reads
//! `locale:<L>:version:<V>:<normalized>`.
//!
//! # Examples
//!
//! ```
//! use cachette_core::{CacheKey, DigestOptions, KeyDigest};
//!
//! let digest = KeyDigest::new(1, "en");
//! let plain = DigestOptions { no_sha: true, ..DigestOptions::default() };
//!
//! assert_eq!(
//!     digest.digest(&CacheKey::list(["a", "b"]), plain),
//!     "locale:en:version:1:a:b"
//! );
//! assert_eq!(
//!     digest.digest(&CacheKey::scalar("abc"), DigestOptions::default()),
//!     "a15b3227c1c502fc52d24578b39da7e5d5bff263"
//! );
//! ```

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::CacheKey;

/// Switches controlling the digest pipeline. All steps run by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestOptions {
    pub no_version: bool,
    pub no_locale: bool,
    pub no_sha: bool,
}

/// The version and locale a digest is computed against.
///
/// Usually produced by [`CacheRegistry::key_digest`](crate::CacheRegistry::key_digest),
/// which reads the current version config and asks the locale provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyDigest {
    version: u64,
    locale: String,
}

impl KeyDigest {
    pub fn new(version: u64, locale: impl Into<String>) -> Self {
        Self {
            version,
            locale: locale.into(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Computes the digest of `key`. Never fails.
    pub fn digest(&self, key: &CacheKey, options: DigestOptions) -> String {
        let mut out = key.normalize();

        if !options.no_version {
            out = format!("version:{}:{}", self.version, out);
        }
        if !options.no_locale {
            out = format!("locale:{}:{}", self.locale, out);
        }
        if !options.no_sha {
            out = hex::encode(Sha1::digest(out.as_bytes()));
        }

        out
    }
}
