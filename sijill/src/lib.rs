//! # Sijill — dependency-resolution container for Rust
//!
//! Maps capability [`Token`]s to recipes and builds object graphs on demand
//! under three lifetimes: per request, per scope, and per container.
//!
//! ```rust
//! use sijill::prelude::*;
//! use std::sync::Arc;
//!
//! let answer = Token::<u32>::new("Answer");
//! let container = Container::builder()
//!     .singleton_value(&answer, Arc::new(42))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(*container.resolve(&answer).unwrap(), 42);
//! ```

pub use sijill_container::*;
pub use sijill_support::*;
