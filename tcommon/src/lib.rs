//! Run ids, metadata, sampling options, and the boxed-future alias used
//! across the tether crates.
//!
//! ```rust
//! use tcommon::{GenerationOptions, MetadataMap, RunId};
//!
//! let run = RunId::from("run-1");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("tenant".to_string(), "acme".to_string());
//!
//! let options = GenerationOptions::default().with_temperature(0.3);
//! assert_eq!(run.as_str(), "run-1");
//! assert_eq!(options.temperature, Some(0.3));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use tcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Run identifiers and free-form metadata shared across crates.
    //!
    //! ```rust
    //! use tcommon::RunId;
    //!
    //! let generated = RunId::generate();
    //! assert!(!generated.as_str().is_empty());
    //! assert_ne!(generated, RunId::generate());
    //! ```

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    /// Identifies one run of an agent from prompt assembly to its outcome.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct RunId(String);

    impl RunId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn generate() -> Self {
            Self(format!("run-{}", uuid::Uuid::new_v4().simple()))
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for RunId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for RunId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for RunId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod model {
    //! Sampling settings forwarded to model requests.
    //!
    //! ```rust
    //! use tcommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_max_tokens(128);
    //!
    //! assert_eq!(options.temperature, Some(0.2));
    //! assert_eq!(options.max_tokens, Some(128));
    //! ```

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }
    }
}

pub mod registry {
    //! Name-keyed map wrapper that refuses silent overwrites.
    //!
    //! ```rust
    //! use tcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! assert!(registry.try_insert("alpha".to_string(), 1_u32).is_ok());
    //! assert!(registry.try_insert("alpha".to_string(), 2_u32).is_err());
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! ```

    use std::borrow::Borrow;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: BTreeMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Ord,
    {
        fn default() -> Self {
            Self {
                items: BTreeMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Ord,
    {
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts `value` under `key` unless the key is taken, in which case the
        /// rejected value is handed back.
        pub fn try_insert(&mut self, key: K, value: V) -> Result<(), V> {
            if self.items.contains_key(&key) {
                return Err(value);
            }

            self.items.insert(key, value);
            Ok(())
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Ord + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Ord + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Ord + ?Sized,
        {
            self.items.contains_key(key)
        }

        /// Values in key order.
        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{MetadataMap, RunId};
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::Registry;
