//! Typed dependency lists for constructor registrations.
//!
//! A constructor declares its dependencies as a token or a tuple of tokens.
//! The tuple fixes both the order in which dependencies are resolved and the
//! shape of the value handed to the builder, so a builder that expects
//! different arguments does not compile.
//!
//! ```rust,ignore
//! builder.scoped(&PROCESSOR, (LOGGER, STORAGE), |(logger, storage)| {
//!     Ok(Arc::new(Processor::new(logger, storage)) as Arc<dyn Processor>)
//! });
//! ```

use std::sync::Arc;

use crate::container::resolve;
use crate::error::Result;
use crate::registry::Resolver;
use crate::token::{Token, TokenKey};

/// An ordered list of dependency tokens.
pub trait Dependencies: Send + Sync + 'static {
    /// Resolved instances, in declaration order.
    type Instances;

    /// Keys in declaration order.
    fn keys(&self) -> Vec<TokenKey>;

    /// Resolves every dependency in declaration order, stopping at the first
    /// failure.
    fn resolve_all(&self, resolver: &dyn Resolver) -> Result<Self::Instances>;
}

impl Dependencies for () {
    type Instances = ();

    fn keys(&self) -> Vec<TokenKey> {
        Vec::new()
    }

    fn resolve_all(&self, _resolver: &dyn Resolver) -> Result<()> {
        Ok(())
    }
}

impl<A> Dependencies for Token<A>
where
    A: ?Sized + Send + Sync + 'static,
{
    type Instances = Arc<A>;

    fn keys(&self) -> Vec<TokenKey> {
        vec![*self.key()]
    }

    fn resolve_all(&self, resolver: &dyn Resolver) -> Result<Arc<A>> {
        resolve(resolver, self)
    }
}

macro_rules! impl_dependencies_for_tuple {
    ($($name:ident),+) => {
        impl<$($name),+> Dependencies for ($(Token<$name>,)+)
        where
            $($name: ?Sized + Send + Sync + 'static),+
        {
            type Instances = ($(Arc<$name>,)+);

            #[allow(non_snake_case)]
            fn keys(&self) -> Vec<TokenKey> {
                let ($($name,)+) = self;
                vec![$(*$name.key()),+]
            }

            #[allow(non_snake_case)]
            fn resolve_all(&self, resolver: &dyn Resolver) -> Result<Self::Instances> {
                let ($($name,)+) = self;
                Ok(($(resolve(resolver, $name)?,)+))
            }
        }
    };
}

impl_dependencies_for_tuple!(A);
impl_dependencies_for_tuple!(A, B);
impl_dependencies_for_tuple!(A, B, C);
impl_dependencies_for_tuple!(A, B, C, D);
impl_dependencies_for_tuple!(A, B, C, D, E);
impl_dependencies_for_tuple!(A, B, C, D, E, F);
impl_dependencies_for_tuple!(A, B, C, D, E, F, G);
impl_dependencies_for_tuple!(A, B, C, D, E, F, G, H);
