//! # The Container — heart of Sijill
//!
//! Maps tokens to recipes and resolves object graphs on demand, honoring
//! each registration's [`Lifetime`].
//!
//! # Architecture
//! ```text
//! ContainerBuilder  ──build()──>  Container ──resolve()──> Arc<T>
//!                                    │
//!                              create_scope()
//!                                    │
//!                                    ▼
//!                              ScopedContainer ──resolve()──> Arc<T>
//! ```
//!
//! Resolution walks the graph depth-first. Every constructor dependency is
//! resolved with the same scope as the top-level request, so a scoped token
//! three levels down still lands in the caller's scope. Singletons are cached
//! on the container and shared by every scope.
//!
//! # Examples
//! ```rust
//! use sijill_container::prelude::*;
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, msg: &str);
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, msg: &str) { println!("{msg}"); }
//! }
//!
//! struct Greeter {
//!     logger: Arc<dyn Logger>,
//!     greeting: String,
//! }
//!
//! let logger = Token::<dyn Logger>::new("Logger");
//! let greeter = Token::<Greeter>::new("Greeter");
//!
//! let container = Container::builder()
//!     .singleton(&logger, (), |()| Ok(Arc::new(ConsoleLogger) as Arc<dyn Logger>))
//!     .register(&greeter, Lifetime::PerRequest, logger, ("hello".to_string(),), |logger, (greeting,)| {
//!         Ok(Arc::new(Greeter { logger, greeting }))
//!     })
//!     .build()
//!     .expect("Failed to build container");
//!
//! let g = container.resolve(&greeter).expect("Failed to resolve");
//! g.logger.log(&g.greeting);
//! ```

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use sijill_support::rendering::suggest_similar;
use tracing::{debug, info, instrument, trace, warn};

use crate::deps::Dependencies;
use crate::error::{
    BuildResult, CycleError, GraphError, NoActiveScopeError, NotRegisteredError, Result,
    SijillError,
};
use crate::graph::{DependencyInfo, GraphValidator};
use crate::lifetime::Lifetime;
use crate::provider::Provider;
use crate::registry::{BuildFn, FactoryFn, Instance, Recipe, Registration, Registry, Resolver};
use crate::scope::{Scope, Slot};
use crate::settings::Settings;
use crate::token::{Token, TokenKey};

// ============================================================
// ContainerBuilder
// ============================================================

/// Collects registrations and builds a [`Container`].
///
/// Registration only happens here. The built container is read-only, so
/// registration can never race with resolution.
///
/// # Examples
/// ```rust,ignore
/// let container = Container::builder()
///     .singleton_value(&CONFIG, Arc::new(Config::load()))
///     .singleton(&STORAGE, CONFIG, |config| { ... })
///     .scoped(&PROCESSOR, (LOGGER, STORAGE), |(logger, storage)| { ... })
///     .build()?;
/// ```
pub struct ContainerBuilder {
    registry: Registry,
    settings: Settings,
    error: Option<SijillError>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            registry: Registry::new(),
            settings: Settings::default(),
            error: None,
        }
    }

    /// Replace all settings. Applies to registrations made afterwards.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Allow a later registration to replace an earlier one (the default).
    pub fn allow_override(mut self, allow: bool) -> Self {
        self.settings.allow_override = allow;
        self
    }

    /// Validate the dependency graph in [`build()`](Self::build).
    pub fn validate_on_build(mut self, validate: bool) -> Self {
        self.settings.validate_on_build = validate;
        self
    }

    // ── Constructor-style ──

    /// Register a constructor for `token`.
    ///
    /// On every build, `dependencies` are resolved in order, then `builder`
    /// is called with the resolved instances followed by a clone of
    /// `params`. Lifetime caching applies around the whole call.
    pub fn register<T, D, P, F>(
        self,
        token: &Token<T>,
        lifetime: Lifetime,
        dependencies: D,
        params: P,
        builder: F,
    ) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        P: Clone + Send + Sync + 'static,
        F: Fn(D::Instances, P) -> BuildResult<Arc<T>> + Send + Sync + 'static,
    {
        let keys = dependencies.keys();
        let build: BuildFn = Arc::new(move |resolver: &dyn Resolver| -> Result<Instance> {
            let instances = dependencies.resolve_all(resolver)?;
            let instance = builder(instances, params.clone()).map_err(SijillError::Build)?;
            Ok(Arc::new(instance) as Instance)
        });

        self.register_internal(Registration::constructor(*token.key(), lifetime, keys, build))
    }

    /// Register a [`Lifetime::PerRequest`] constructor without literal parameters.
    pub fn per_request<T, D, F>(self, token: &Token<T>, dependencies: D, builder: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D::Instances) -> BuildResult<Arc<T>> + Send + Sync + 'static,
    {
        self.register(token, Lifetime::PerRequest, dependencies, (), move |deps, ()| builder(deps))
    }

    /// Register a [`Lifetime::Scoped`] constructor without literal parameters.
    pub fn scoped<T, D, F>(self, token: &Token<T>, dependencies: D, builder: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D::Instances) -> BuildResult<Arc<T>> + Send + Sync + 'static,
    {
        self.register(token, Lifetime::Scoped, dependencies, (), move |deps, ()| builder(deps))
    }

    /// Register a [`Lifetime::Singleton`] constructor without literal parameters.
    pub fn singleton<T, D, F>(self, token: &Token<T>, dependencies: D, builder: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D::Instances) -> BuildResult<Arc<T>> + Send + Sync + 'static,
    {
        self.register(token, Lifetime::Singleton, dependencies, (), move |deps, ()| builder(deps))
    }

    // ── Factory-style ──

    /// Register a zero-argument factory for `token`.
    ///
    /// The factory bypasses dependency resolution and must capture whatever
    /// it needs. `Scoped` and `Singleton` still cache its result.
    pub fn register_factory<T, F>(self, token: &Token<T>, lifetime: Lifetime, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn() -> BuildResult<Arc<T>> + Send + Sync + 'static,
    {
        let factory: FactoryFn = Arc::new(move || -> Result<Instance> {
            let instance = factory().map_err(SijillError::Build)?;
            Ok(Arc::new(instance) as Instance)
        });

        self.register_internal(Registration::factory(*token.key(), lifetime, factory))
    }

    /// Register an already built instance as a singleton.
    pub fn singleton_value<T>(self, token: &Token<T>, value: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.register_factory(token, Lifetime::Singleton, move || Ok(Arc::clone(&value)))
    }

    // ── Provider modules ──

    /// Apply a [`Provider`] module.
    pub fn add_provider(self, provider: &dyn Provider) -> Self {
        debug!(provider = provider.name(), "Adding provider");
        provider.register(self)
    }

    // ── Build ──

    /// Build the container.
    ///
    /// Fails with the first rejected registration, if any. With
    /// [`validate_on_build`](Self::validate_on_build) the dependency graph is
    /// also checked for missing tokens, cycles and captive lifetimes: a single
    /// problem is returned as is, several as [`SijillError::InvalidGraph`].
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Result<Container> {
        info!(registered = self.registry.len(), "Building container");

        if let Some(err) = self.error {
            return Err(err);
        }

        if self.settings.validate_on_build {
            let nodes = self
                .registry
                .all_registrations()
                .iter()
                .map(|(key, reg)| {
                    (
                        *key,
                        DependencyInfo {
                            key: *key,
                            dependencies: reg.dependencies().to_vec(),
                            lifetime: reg.lifetime(),
                        },
                    )
                })
                .collect();

            let mut violations =
                GraphValidator::new(nodes, self.settings.max_suggestions).validate();
            match violations.len() {
                0 => {}
                1 => return Err(violations.remove(0)),
                _ => return Err(SijillError::InvalidGraph(GraphError { violations })),
            }
        }

        info!("Container built");
        Ok(Container {
            registry: self.registry,
            singletons: DashMap::new(),
            settings: self.settings,
        })
    }

    // ── Internal ──

    fn register_internal(mut self, registration: Registration) -> Self {
        if let Err(err) = self.registry.register(registration, self.settings.allow_override) {
            warn!(error = %err, "Registration rejected");
            self.error.get_or_insert(err);
        }
        self
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("registered", &self.registry.len())
            .field("settings", &self.settings)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Read-only, thread-safe container.
///
/// Owns the registry and the singleton cache; both are dropped with it.
/// Created by [`ContainerBuilder::build()`].
pub struct Container {
    registry: Registry,
    singletons: DashMap<TokenKey, Slot>,
    settings: Settings,
}

impl Container {
    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Resolve `token` outside any scope.
    ///
    /// Fails with [`SijillError::NoActiveScope`] if the token, or anything it
    /// depends on, is [`Lifetime::Scoped`].
    pub fn resolve<T>(&self, token: &Token<T>) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve_in(token, None)
    }

    /// Resolve `token` using `scope` for every scoped token in the graph.
    pub fn resolve_in<T>(&self, token: &Token<T>, scope: Option<&Scope>) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        trace!(token = %token, scoped = scope.is_some(), "Resolving");

        let root = Frame { container: self, scope, key: None, parent: None };
        resolve(&root, token)
    }

    /// Create a scope handle bound to a fresh, empty [`Scope`].
    pub fn create_scope(&self) -> ScopedContainer<'_> {
        debug!("Creating new scope");
        ScopedContainer { container: self, scope: Scope::new() }
    }

    /// The stored registration for `token`.
    pub fn lookup<T: ?Sized>(&self, token: &Token<T>) -> Result<&Registration> {
        self.registry
            .get(token.key())
            .ok_or_else(|| self.not_registered(token.key(), None))
    }

    pub fn is_registered<T: ?Sized>(&self, token: &Token<T>) -> bool {
        self.registry.get(token.key()).is_some()
    }

    /// Number of registered tokens.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Looks up, applies the lifetime policy and builds when needed.
    fn resolve_from(&self, key: &TokenKey, parent: &Frame<'_>) -> Result<Instance> {
        let registration = self
            .registry
            .get(key)
            .ok_or_else(|| self.not_registered(key, parent.key))?;

        match registration.lifetime {
            Lifetime::Singleton => {
                let existing = self.singletons.get(key).map(|slot| Arc::clone(&slot));
                let slot = existing
                    .unwrap_or_else(|| Arc::clone(&self.singletons.entry(*key).or_default()));

                if let Some(instance) = slot.get() {
                    trace!(token = %key, "Singleton cache hit");
                    return Ok(Arc::clone(instance));
                }
                slot.get_or_try_init(|| self.build(registration, parent)).cloned()
            }
            Lifetime::Scoped => {
                let scope = parent.scope.ok_or_else(|| {
                    SijillError::NoActiveScope(NoActiveScopeError {
                        token: *key,
                        required_by: parent.key,
                    })
                })?;
                scope.get_or_build(key, || self.build(registration, parent))
            }
            Lifetime::PerRequest => self.build(registration, parent),
        }
    }

    fn build(&self, registration: &Registration, parent: &Frame<'_>) -> Result<Instance> {
        trace!(
            token = %registration.key,
            lifetime = %registration.lifetime,
            "Building instance"
        );

        match &registration.recipe {
            Recipe::Factory(factory) => factory(),
            Recipe::Constructor { build, .. } => {
                let frame = Frame {
                    container: self,
                    scope: parent.scope,
                    key: Some(registration.key),
                    parent: Some(parent),
                };
                build(&frame)
            }
        }
    }

    fn not_registered(&self, key: &TokenKey, required_by: Option<TokenKey>) -> SijillError {
        let names = self.registry.registered_names();
        SijillError::NotRegistered(NotRegisteredError {
            requested: *key,
            required_by,
            suggestions: suggest_similar(key.name(), &names, self.settings.max_suggestions),
        })
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.registry.len())
            .field("singletons", &self.singletons.len())
            .finish()
    }
}

// ═══════════════════════════════════════════
// ScopedContainer
// ═══════════════════════════════════════════

/// A scope handle: the container plus one [`Scope`] it owns.
///
/// Scoped instances live as long as the handle. The scope is internally
/// synchronized, so the handle may be shared across threads.
pub struct ScopedContainer<'a> {
    container: &'a Container,
    scope: Scope,
}

impl ScopedContainer<'_> {
    /// Resolve `token` within this scope.
    pub fn resolve<T>(&self, token: &Token<T>) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.container.resolve_in(token, Some(&self.scope))
    }

    /// The bound scope cache.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl fmt::Debug for ScopedContainer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedContainer").field("scope", &self.scope).finish()
    }
}

// ═══════════════════════════════════════════
// Frame (internal resolver)
// ═══════════════════════════════════════════

/// One step of an in-flight resolution.
///
/// Frames link back to their parent, which gives the chain of tokens
/// currently being built. The root frame has no key.
struct Frame<'a> {
    container: &'a Container,
    scope: Option<&'a Scope>,
    key: Option<TokenKey>,
    parent: Option<&'a Frame<'a>>,
}

impl Frame<'_> {
    /// Tokens being built, outermost first.
    fn chain(&self) -> Vec<TokenKey> {
        let mut chain = Vec::new();
        let mut frame = Some(self);
        while let Some(current) = frame {
            chain.extend(current.key);
            frame = current.parent;
        }
        chain.reverse();
        chain
    }
}

impl Resolver for Frame<'_> {
    fn resolve_key(&self, key: &TokenKey) -> Result<Instance> {
        let chain = self.chain();
        if let Some(start) = chain.iter().position(|k| k == key) {
            let mut cycle = chain[start..].to_vec();
            cycle.push(*key);

            warn!(cycle = ?cycle, "Cyclic dependency detected");
            return Err(SijillError::CyclicDependency(CycleError { chain: cycle }));
        }

        self.container.resolve_from(key, self)
    }
}

// ═══════════════════════════════════════════
// Free function used by dependency lists
// ═══════════════════════════════════════════

/// Resolve a typed token from a [`Resolver`].
pub fn resolve<T>(resolver: &dyn Resolver, token: &Token<T>) -> Result<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    let instance = resolver.resolve_key(token.key())?;
    instance
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| SijillError::TypeMismatch {
            token: *token.key(),
            expected: type_name::<T>(),
        })
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder, ScopedContainer, resolve};
    pub use crate::deps::Dependencies;
    pub use crate::error::{BuildError, BuildResult, Result, SijillError};
    pub use crate::lifetime::Lifetime;
    pub use crate::provider::Provider;
    pub use crate::scope::Scope;
    pub use crate::settings::Settings;
    pub use crate::token::Token;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
