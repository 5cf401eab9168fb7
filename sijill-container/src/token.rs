//! Capability tokens.
//!
//! A [`Token`] names a capability the container can produce. Identity is
//! allocated when the token is created, so two tokens are equal only if one
//! is a copy of the other, whatever their names or types.
//!
//! [`TokenKey`] is the type-erased form used as a map key inside the
//! registry, the singleton cache and every [`Scope`](crate::scope::Scope).

use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use sijill_support::rendering::shorten_type_name;

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// Typed handle for a capability whose instances are `Arc<T>`.
///
/// `T` is usually a trait object, so the same contract can be satisfied by
/// different implementations in different containers.
///
/// # Examples
/// ```
/// use sijill_container::token::Token;
///
/// trait Storage: Send + Sync {}
///
/// let storage = Token::<dyn Storage>::new("Storage");
/// let copy = storage;
/// assert_eq!(storage, copy);
///
/// // Same name, same type, different identity.
/// assert_ne!(storage, Token::<dyn Storage>::new("Storage"));
/// ```
pub struct Token<T: ?Sized> {
    key: TokenKey,
    _instance: PhantomData<fn() -> T>,
}

impl<T: ?Sized + 'static> Token<T> {
    /// Creates a token with a fresh identity.
    pub fn new(name: &'static str) -> Self {
        Self {
            key: TokenKey {
                id: NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed),
                name,
                type_name: type_name::<T>(),
            },
            _instance: PhantomData,
        }
    }
}

impl<T: ?Sized> Token<T> {
    /// The type-erased key for this token.
    #[inline]
    pub fn key(&self) -> &TokenKey {
        &self.key
    }

    /// The human-readable name given at creation.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.key.name
    }
}

impl<T: ?Sized> Clone for Token<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Token<T> {}

impl<T: ?Sized> PartialEq for Token<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T: ?Sized> Eq for Token<T> {}

impl<T: ?Sized> Hash for Token<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?})", self.key)
    }
}

impl<T: ?Sized> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.key, f)
    }
}

/// Type-erased token identity.
#[derive(Clone, Copy)]
pub struct TokenKey {
    id: u64,
    name: &'static str,
    type_name: &'static str,
}

impl TokenKey {
    /// Process-unique identity number.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Name given when the token was created.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fully qualified name of the instance type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

// Identity only: name and type are labels for humans.
impl PartialEq for TokenKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TokenKey {}

impl Hash for TokenKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}: {}", self.name, self.id, self.type_name)
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, shorten_type_name(self.type_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Logger: Send + Sync {}
    struct FileLogger;

    #[test]
    fn copies_share_identity() {
        let token = Token::<dyn Logger>::new("Logger");
        let copy = token;
        assert_eq!(token, copy);
        assert_eq!(token.key().id(), copy.key().id());
    }

    #[test]
    fn identity_is_not_structural() {
        let a = Token::<dyn Logger>::new("Logger");
        let b = Token::<dyn Logger>::new("Logger");
        assert_ne!(a, b);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn key_in_hashmap() {
        use std::collections::HashMap;

        let logger = Token::<dyn Logger>::new("Logger");
        let file = Token::<FileLogger>::new("FileLogger");

        let mut map = HashMap::new();
        map.insert(*logger.key(), "logger");
        map.insert(*file.key(), "file");

        assert_eq!(map.get(logger.key()), Some(&"logger"));
        assert_eq!(map.get(Token::<u8>::new("Other").key()), None);
    }

    #[test]
    fn display_uses_name_and_short_type() {
        let token = Token::<dyn Logger>::new("Logger");
        assert_eq!(token.to_string(), "Logger (dyn Logger)");
        assert!(format!("{token:?}").contains("Logger#"));
    }
}
