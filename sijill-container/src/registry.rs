//! Token registry — stores how to build each token.
//!
//! The registry maps [`TokenKey`] to a [`Registration`]: a lifetime plus a
//! recipe that is either a constructor (dependency tokens resolved first,
//! then literal parameters) or a zero-argument factory.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{AlreadyRegisteredError, Result, SijillError};
use crate::lifetime::Lifetime;
use crate::token::TokenKey;

/// A built, type-erased instance. Always holds an `Arc<T>` for the token's `T`.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Constructor recipe: resolves its dependencies through the [`Resolver`]
/// and builds the instance.
///
/// # Why `Arc` and not `Box`?
/// Registrations are shared by every thread resolving from the container.
pub type BuildFn = Arc<dyn Fn(&dyn Resolver) -> Result<Instance> + Send + Sync>;

/// Factory recipe: takes no arguments and captures whatever it needs.
pub type FactoryFn = Arc<dyn Fn() -> Result<Instance> + Send + Sync>;

/// Resolves dependency tokens while a constructor recipe runs.
///
/// Implemented by the container's resolution frames, which carry the active
/// scope and the chain used for cycle detection. Separated from the container
/// so recipes never see more than they need.
pub trait Resolver {
    fn resolve_key(&self, key: &TokenKey) -> Result<Instance>;
}

/// How a registration produces its instance.
#[derive(Clone)]
pub(crate) enum Recipe {
    Constructor {
        build: BuildFn,
        dependencies: Vec<TokenKey>,
    },
    Factory(FactoryFn),
}

/// Stored recipe and lifetime for one token.
#[derive(Clone)]
pub struct Registration {
    pub(crate) key: TokenKey,
    pub(crate) lifetime: Lifetime,
    pub(crate) recipe: Recipe,
}

impl Registration {
    pub(crate) fn constructor(
        key: TokenKey,
        lifetime: Lifetime,
        dependencies: Vec<TokenKey>,
        build: BuildFn,
    ) -> Self {
        Self { key, lifetime, recipe: Recipe::Constructor { build, dependencies } }
    }

    pub(crate) fn factory(key: TokenKey, lifetime: Lifetime, factory: FactoryFn) -> Self {
        Self { key, lifetime, recipe: Recipe::Factory(factory) }
    }

    /// The token this registration satisfies.
    pub fn key(&self) -> &TokenKey {
        &self.key
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Declared dependency tokens in resolution order. Empty for factories.
    pub fn dependencies(&self) -> &[TokenKey] {
        match &self.recipe {
            Recipe::Constructor { dependencies, .. } => dependencies,
            Recipe::Factory(_) => &[],
        }
    }

    pub fn is_factory(&self) -> bool {
        matches!(self.recipe, Recipe::Factory(_))
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("factory", &self.is_factory())
            .field("dependencies", &self.dependencies())
            .finish()
    }
}

/// Stores all registrations.
///
/// Filled by the builder during setup and read-only once the container is
/// constructed.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    registrations: HashMap<TokenKey, Registration>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a registration, replacing any previous one for the same token.
    ///
    /// # Errors
    /// Returns [`SijillError::AlreadyRegistered`] if the token is already
    /// registered and `allow_override` is false.
    pub fn register(&mut self, registration: Registration, allow_override: bool) -> Result<()> {
        let key = registration.key;

        if self.registrations.contains_key(&key) {
            if !allow_override {
                return Err(SijillError::AlreadyRegistered(AlreadyRegisteredError { token: key }));
            }
            debug!(token = %key, "Overriding previous registration");
        }

        debug!(
            token = %key,
            lifetime = %registration.lifetime,
            factory = registration.is_factory(),
            "Registered token"
        );
        self.registrations.insert(key, registration);
        Ok(())
    }

    pub fn get(&self, key: &TokenKey) -> Option<&Registration> {
        self.registrations.get(key)
    }

    /// Returns all registrations (for validation).
    pub fn all_registrations(&self) -> &HashMap<TokenKey, Registration> {
        &self.registrations
    }

    /// Returns the number of registered tokens.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Names of every registered token, for suggestions.
    pub fn registered_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.registrations.keys().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
