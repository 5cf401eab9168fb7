//! Error types for Sijill container operations.
//!
//! Every resolution failure is returned to the immediate caller. The
//! container never retries, never substitutes a default instance and never
//! hands out a partially built graph.

use std::fmt;

use sijill_support::rendering::render_chain;

use crate::lifetime::Lifetime;
use crate::token::TokenKey;

/// Error produced by a builder or factory.
pub type BuildError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by builders and factories.
pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// Main error type for all Sijill operations.
#[derive(Debug, thiserror::Error)]
pub enum SijillError {
    /// Requested token was never registered.
    #[error("{}", .0)]
    NotRegistered(NotRegisteredError),

    /// A scoped token was resolved without a scope.
    #[error("{}", .0)]
    NoActiveScope(NoActiveScopeError),

    /// A token re-entered its own resolution before it was built.
    #[error("{}", .0)]
    CyclicDependency(CycleError),

    /// A consumer depends on a token that lives shorter than itself.
    #[error("{}", .0)]
    LifetimeMismatch(LifetimeMismatchError),

    /// Graph validation found more than one problem.
    #[error("{}", .0)]
    InvalidGraph(GraphError),

    /// Token was already registered and overriding is disabled.
    #[error("{}", .0)]
    AlreadyRegistered(AlreadyRegisteredError),

    /// A cached or built instance was not of the token's type.
    #[error("Type mismatch for {token}: expected Arc<{expected}>")]
    TypeMismatch {
        token: TokenKey,
        expected: &'static str,
    },

    /// A lifetime name could not be parsed.
    #[error("Unknown lifetime {0:?}: expected one of singleton, scoped, per-request")]
    UnknownLifetime(String),

    /// The builder or factory itself failed. Passed through untouched.
    #[error(transparent)]
    Build(BuildError),
}

impl SijillError {
    /// Returns the builder error if this is a [`SijillError::Build`].
    pub fn build_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            SijillError::Build(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Error when a token has no registration.
#[derive(Debug)]
pub struct NotRegisteredError {
    /// The token that was requested
    pub requested: TokenKey,
    /// The registration that declared it as a dependency, if any
    pub required_by: Option<TokenKey>,
    /// Registered tokens with similar names
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token not registered: {}", self.requested)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        if self.suggestions.iter().any(|name| name == self.requested.name()) {
            write!(
                f,
                "\n  Note: another token is also named {:?}. Tokens match by identity, \
                 so resolve the token instance that was registered",
                self.requested.name()
            )?;
        }

        write!(
            f,
            "\n  Hint: register {:?} on the builder before calling .build()",
            self.requested.name()
        )
    }
}

/// Error when a scoped token is resolved outside any scope.
#[derive(Debug)]
pub struct NoActiveScopeError {
    pub token: TokenKey,
    pub required_by: Option<TokenKey>,
}

impl fmt::Display for NoActiveScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No active scope to resolve scoped token {}", self.token)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        write!(f, "\n  Hint: resolve through container.create_scope()")
    }
}

/// Error when a token depends on itself, directly or transitively.
#[derive(Debug)]
pub struct CycleError {
    /// The chain that forms the cycle, first and last entries are equal.
    /// Example: ["A", "B", "A"]
    pub chain: Vec<TokenKey>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.chain.iter().map(|k| k.name()).collect();
        write!(f, "Cyclic dependency detected:\n  {}", render_chain(&names))?;
        write!(f, "\n  Hint: break the cycle with a factory that builds one side lazily")
    }
}

/// Error when a longer-lived consumer captures a shorter-lived dependency.
///
/// A Singleton holding a Scoped instance would keep the first scope's
/// instance alive forever.
#[derive(Debug)]
pub struct LifetimeMismatchError {
    pub dependency: TokenKey,
    pub dependency_lifetime: Lifetime,
    pub consumer: TokenKey,
    pub consumer_lifetime: Lifetime,
}

impl fmt::Display for LifetimeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lifetime mismatch: cannot inject {} ({}) into {} ({})",
            self.dependency, self.dependency_lifetime, self.consumer, self.consumer_lifetime,
        )?;
        write!(
            f,
            "\n  Hint: register {} as {} or longer",
            self.dependency.name(),
            self.consumer_lifetime,
        )
    }
}

/// Every violation found by build-time graph validation.
#[derive(Debug)]
pub struct GraphError {
    pub violations: Vec<SijillError>,
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dependency graph has {} problems:", self.violations.len())?;
        for (i, violation) in self.violations.iter().enumerate() {
            let text = violation.to_string().replace('\n', "\n     ");
            write!(f, "\n  {}. {text}", i + 1)?;
        }
        Ok(())
    }
}

/// Error when registering a token twice with overriding disabled.
#[derive(Debug)]
pub struct AlreadyRegisteredError {
    pub token: TokenKey,
}

impl fmt::Display for AlreadyRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token already registered: {}", self.token)?;
        write!(f, "\n  Hint: call .allow_override(true) to let the later registration win")
    }
}

/// Convenient Result type for Sijill operations.
pub type Result<T> = std::result::Result<T, SijillError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    #[test]
    fn not_registered_error_display() {
        let err = SijillError::NotRegistered(NotRegisteredError {
            requested: *Token::<String>::new("Storge").key(),
            required_by: Some(*Token::<u8>::new("Processor").key()),
            suggestions: vec!["Storage".into()],
        });

        let msg = err.to_string();
        assert!(msg.contains("not registered"));
        assert!(msg.contains("Storge"));
        assert!(msg.contains("Required by: Processor"));
        assert!(msg.contains("- Storage"));
    }

    #[test]
    fn same_name_different_token_is_noted() {
        let err = NotRegisteredError {
            requested: *Token::<u8>::new("Storage").key(),
            required_by: None,
            suggestions: vec!["Storage".into()],
        };
        assert!(err.to_string().contains("another token is also named \"Storage\""));

        let typo = NotRegisteredError { suggestions: vec!["Storagee".into()], ..err };
        assert!(!typo.to_string().contains("another token"));
    }

    #[test]
    fn cycle_error_display() {
        let a = *Token::<u8>::new("A").key();
        let b = *Token::<u16>::new("B").key();
        let err = SijillError::CyclicDependency(CycleError { chain: vec![a, b, a] });

        let msg = err.to_string();
        assert!(msg.contains("Cyclic"));
        assert!(msg.contains("A → B → A"));
    }

    #[test]
    fn lifetime_mismatch_display() {
        let err = SijillError::LifetimeMismatch(LifetimeMismatchError {
            dependency: *Token::<u8>::new("Session").key(),
            dependency_lifetime: Lifetime::Scoped,
            consumer: *Token::<u16>::new("Cache").key(),
            consumer_lifetime: Lifetime::Singleton,
        });

        let msg = err.to_string();
        assert!(msg.contains("Lifetime mismatch"));
        assert!(msg.contains("Scoped"));
        assert!(msg.contains("Singleton"));
    }

    #[test]
    fn graph_error_lists_each_violation() {
        let a = *Token::<u8>::new("A").key();
        let err = SijillError::InvalidGraph(GraphError {
            violations: vec![
                SijillError::CyclicDependency(CycleError { chain: vec![a, a] }),
                SijillError::UnknownLifetime("forever".into()),
            ],
        });

        let msg = err.to_string();
        assert!(msg.starts_with("Dependency graph has 2 problems:"));
        assert!(msg.contains("\n  1. Cyclic dependency detected:\n       A → A"));
        assert!(msg.contains("\n  2. Unknown lifetime \"forever\""));
    }

    #[test]
    fn build_error_is_transparent() {
        let err = SijillError::Build("disk full".into());
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(err.build_error().map(|e| e.to_string()).as_deref(), Some("disk full"));
        assert!(SijillError::UnknownLifetime("x".into()).build_error().is_none());
    }
}
