//! Core container implementation for Sijill.

pub mod container;
pub mod deps;
pub mod error;
mod graph;
pub mod lifetime;
pub mod provider;
pub mod registry;
pub mod scope;
pub mod settings;
pub mod token;

pub use container::{Container, ContainerBuilder, ScopedContainer, prelude};
pub use error::{BuildError, BuildResult, Result, SijillError};
pub use lifetime::Lifetime;
pub use scope::Scope;
pub use token::{Token, TokenKey};
