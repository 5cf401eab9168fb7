//! Instance lifetime policies.
//!
//! A [`Lifetime`] decides how long a resolved instance is reused:
//! - [`Lifetime::Singleton`] — one instance per container
//! - [`Lifetime::Scoped`] — one instance per [`Scope`](crate::scope::Scope)
//! - [`Lifetime::PerRequest`] — a new instance on every resolution
//!
//! # Ordering
//! Lifetimes are ordered by how long their instances live:
//! `Singleton > Scoped > PerRequest`.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::SijillError;

/// Defines the lifetime of instances produced for a token.
///
/// # Examples
/// ```
/// use sijill_container::lifetime::Lifetime;
///
/// assert!(Lifetime::Singleton > Lifetime::Scoped);
/// assert!(Lifetime::Scoped > Lifetime::PerRequest);
/// assert_eq!(Lifetime::default(), Lifetime::PerRequest);
/// assert_eq!("scoped".parse::<Lifetime>().unwrap(), Lifetime::Scoped);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Lifetime {
    /// New instance built on every resolution. Never cached.
    #[default]
    #[serde(alias = "per_request", alias = "transient")]
    PerRequest,

    /// One instance per scope.
    ///
    /// Built on first resolution within a scope and dropped with it.
    /// Resolving a scoped token without a scope is an error.
    Scoped,

    /// One instance for the whole container.
    ///
    /// Built on first resolution and kept until the container is dropped,
    /// no matter which scope (if any) asked for it.
    Singleton,
}

impl Lifetime {
    #[inline]
    fn ordering(&self) -> u8 {
        match self {
            Lifetime::Singleton => 2,
            Lifetime::Scoped => 1,
            Lifetime::PerRequest => 0,
        }
    }
}

impl PartialOrd for Lifetime {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Lifetime {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordering().cmp(&other.ordering())
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Singleton => write!(f, "Singleton"),
            Lifetime::Scoped => write!(f, "Scoped"),
            Lifetime::PerRequest => write!(f, "PerRequest"),
        }
    }
}

/// Unknown names are rejected rather than falling back to `PerRequest`.
impl FromStr for Lifetime {
    type Err = SijillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "singleton" => Ok(Lifetime::Singleton),
            "scoped" => Ok(Lifetime::Scoped),
            "per-request" | "per_request" | "perrequest" | "transient" => Ok(Lifetime::PerRequest),
            _ => Err(SijillError::UnknownLifetime(s.to_string())),
        }
    }
}
