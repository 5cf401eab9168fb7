//! Provider trait — a module of related registrations.
//!
//! Providers group the tokens of one concern so the composition root stays
//! short:
//!
//! ```rust,ignore
//! let container = Container::builder()
//!     .add_provider(&InfrastructureProvider { data_dir })
//!     .add_provider(&RequestProvider)
//!     .build()?;
//! ```

use crate::container::ContainerBuilder;

/// A module that registers related tokens into a [`ContainerBuilder`].
///
/// Called once, while the container is being set up.
pub trait Provider: Send + Sync {
    /// Add this module's registrations to `builder`.
    fn register(&self, builder: ContainerBuilder) -> ContainerBuilder;

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use crate::lifetime::Lifetime;
    use crate::token::Token;
    use std::sync::Arc;

    struct GreetingProvider {
        greeting: Token<String>,
        shout: Token<String>,
    }

    impl Provider for GreetingProvider {
        fn register(&self, builder: ContainerBuilder) -> ContainerBuilder {
            builder
                .singleton_value(&self.greeting, Arc::new("hello".to_string()))
                .register(&self.shout, Lifetime::PerRequest, self.greeting, ("!",), |g, (mark,)| {
                    Ok(Arc::new(format!("{}{mark}", g.to_uppercase())))
                })
        }
    }

    #[test]
    fn provider_registers_tokens() {
        let provider = GreetingProvider {
            greeting: Token::new("Greeting"),
            shout: Token::new("Shout"),
        };

        let container = Container::builder().add_provider(&provider).build().unwrap();

        assert_eq!(container.len(), 2);
        assert_eq!(*container.resolve(&provider.shout).unwrap(), "HELLO!");
    }

    #[test]
    fn provider_has_name() {
        let provider = GreetingProvider {
            greeting: Token::new("Greeting"),
            shout: Token::new("Shout"),
        };
        assert!(provider.name().contains("GreetingProvider"));
    }
}
