//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error source carried by opaque variants
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for tiercache
#[derive(Error, Debug)]
pub enum Error {
    /// Key is absent from the cache
    #[error("Key not found: {key}")]
    NotFound {
        /// The key that was looked up
        key: String,
    },

    /// Key is still stored but its TTL has elapsed
    ///
    /// Readers must treat this exactly like [`Error::NotFound`]; the variant
    /// only exists so diagnostics can tell the two apart.
    #[error("Key expired: {key}")]
    Expired {
        /// The key that was looked up
        key: String,
    },

    /// Stored payload could not be encoded or decoded into the requested type
    #[error("Invalid value: {message}")]
    Invalid {
        /// Description of the codec failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Transport or server error reported by a backend
    #[error("Backend error: {message}")]
    Backend {
        /// Description of the backend error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Operation attempted on a cache that has been closed
    #[error("Cache is closed: {backend}")]
    Closed {
        /// Name of the closed backend
        backend: String,
    },

    /// Both tiers failed the same operation
    #[error("Primary and secondary cache both failed (primary: {primary}; secondary: {secondary})")]
    BothTiersFailed {
        /// Error returned by the primary tier
        primary: Box<Error>,
        /// Error returned by the secondary tier
        secondary: Box<Error>,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },
}

// Lookup error creation methods
impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(key: S) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create an expired error
    pub fn expired<S: Into<String>>(key: S) -> Self {
        Self::Expired { key: key.into() }
    }

    /// Create a closed error
    pub fn closed<S: Into<String>>(backend: S) -> Self {
        Self::Closed {
            backend: backend.into(),
        }
    }

    /// Combine the failures of both tiers into one error
    pub fn both_tiers(primary: Error, secondary: Error) -> Self {
        Self::BothTiersFailed {
            primary: Box::new(primary),
            secondary: Box::new(secondary),
        }
    }
}

// Codec error creation methods
impl Error {
    /// Create an invalid value error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid value error with source
    pub fn invalid_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Invalid {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Backend error creation methods
impl Error {
    /// Create a backend error
    pub fn backend<S: Into<String>>(message: S) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Create a backend error with source
    pub fn backend_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration and I/O error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Classification
impl Error {
    /// True for errors that mean "no value" (`NotFound` or `Expired`)
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Expired { .. })
    }

    /// True if the error was raised because the cache is closed
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }
}
