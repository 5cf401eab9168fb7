//! Scope caches.
//!
//! A [`Scope`] holds the [`Scoped`](crate::lifetime::Lifetime::Scoped)
//! instances of one logical unit of work, for example one incoming request.
//! The caller owns it; the container only borrows it for the duration of a
//! resolution and keeps no reference afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::error::Result;
use crate::registry::Instance;
use crate::token::TokenKey;

/// One lazily filled slot per token.
pub(crate) type Slot = Arc<OnceCell<Instance>>;

/// Cache of scoped instances for one unit of work.
///
/// Internally synchronized: sharing a scope between threads keeps the
/// one-instance-per-scope guarantee, because each token's slot is built at
/// most once.
#[derive(Default)]
pub struct Scope {
    slots: Mutex<HashMap<TokenKey, Slot>>,
}

impl Scope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of instances built in this scope so far.
    pub fn len(&self) -> usize {
        self.slots.lock().values().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached instance for `key`, building it with `build` on
    /// first use.
    ///
    /// The map lock is released before `build` runs, so nested resolutions
    /// through the same scope are fine. A failed build leaves the slot empty.
    pub(crate) fn get_or_build(
        &self,
        key: &TokenKey,
        build: impl FnOnce() -> Result<Instance>,
    ) -> Result<Instance> {
        let slot = self.slots.lock().entry(*key).or_default().clone();
        slot.get_or_try_init(build).cloned()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope").field("instances", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SijillError;
    use crate::token::Token;

    fn instance(value: u32) -> Instance {
        Arc::new(Arc::new(value))
    }

    #[test]
    fn builds_once_per_key() {
        let scope = Scope::new();
        let key = *Token::<u32>::new("Counter").key();
        let mut calls = 0;

        let first = scope
            .get_or_build(&key, || {
                calls += 1;
                Ok(instance(1))
            })
            .unwrap();
        let second = scope.get_or_build(&key, || Ok(instance(2))).unwrap();

        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn failed_build_leaves_slot_empty() {
        let scope = Scope::new();
        let key = *Token::<u32>::new("Flaky").key();

        let err = scope
            .get_or_build(&key, || Err(SijillError::Build("boom".into())))
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(scope.is_empty());

        assert!(scope.get_or_build(&key, || Ok(instance(3))).is_ok());
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn distinct_scopes_do_not_share() {
        let key = *Token::<u32>::new("Counter").key();
        let (a, b) = (Scope::new(), Scope::new());

        let from_a = a.get_or_build(&key, || Ok(instance(1))).unwrap();
        let from_b = b.get_or_build(&key, || Ok(instance(1))).unwrap();
        assert!(!Arc::ptr_eq(&from_a, &from_b));
    }
}
