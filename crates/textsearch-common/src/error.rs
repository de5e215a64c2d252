//! Common error handling utilities and patterns
//!
//! Every textsearch crate owns its own `thiserror` enum. This module holds the
//! small set of constructors those enums share so that collaborator code (test
//! backends, mock embedders) can build errors without knowing every variant.

/// Constructors every collaborator-facing error type provides
pub trait CommonError: std::error::Error + Send + Sync + 'static {
    /// The remote service or store could not be reached
    fn unavailable(msg: impl Into<String>) -> Self
    where
        Self: Sized;

    /// A configuration value was missing or invalid
    fn config_error(msg: impl Into<String>) -> Self
    where
        Self: Sized;

    /// The request was cancelled before it completed
    fn cancelled(msg: impl Into<String>) -> Self
    where
        Self: Sized;

    /// Anything that does not fit the categories above
    fn other_error(msg: impl Into<String>) -> Self
    where
        Self: Sized;
}

/// Implements `From<anyhow::Error>` for an error type that implements
/// [`CommonError`], routing the message into its `other_error` variant.
///
/// # Example
/// ```no_run
/// # use textsearch_common::{CommonError, impl_common_conversions};
/// # use thiserror::Error;
/// #
/// # #[derive(Debug, Error)]
/// # enum MyError {
/// #     #[error("Unavailable: {0}")]
/// #     Unavailable(String),
/// #     #[error("Other error: {0}")]
/// #     Other(String),
/// # }
/// #
/// # impl CommonError for MyError {
/// #     fn unavailable(msg: impl Into<String>) -> Self { Self::Unavailable(msg.into()) }
/// #     fn config_error(msg: impl Into<String>) -> Self { Self::Other(msg.into()) }
/// #     fn cancelled(msg: impl Into<String>) -> Self { Self::Other(msg.into()) }
/// #     fn other_error(msg: impl Into<String>) -> Self { Self::Other(msg.into()) }
/// # }
/// #
/// impl_common_conversions!(MyError);
/// ```
#[macro_export]
macro_rules! impl_common_conversions {
    ($error_type:ident) => {
        impl From<anyhow::Error> for $error_type {
            fn from(e: anyhow::Error) -> Self {
                <$error_type as $crate::CommonError>::other_error(format!("{e:#}"))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    enum TestError {
        #[error("Unavailable: {0}")]
        Unavailable(String),
        #[error("Configuration error: {0}")]
        Configuration(String),
        #[error("Cancelled: {0}")]
        Cancelled(String),
        #[error("Other error: {0}")]
        Other(String),
    }

    impl CommonError for TestError {
        fn unavailable(msg: impl Into<String>) -> Self {
            Self::Unavailable(msg.into())
        }

        fn config_error(msg: impl Into<String>) -> Self {
            Self::Configuration(msg.into())
        }

        fn cancelled(msg: impl Into<String>) -> Self {
            Self::Cancelled(msg.into())
        }

        fn other_error(msg: impl Into<String>) -> Self {
            Self::Other(msg.into())
        }
    }

    impl_common_conversions!(TestError);

    #[test]
    fn test_common_error_trait() {
        let err = TestError::unavailable("index offline");
        assert_eq!(err.to_string(), "Unavailable: index offline");

        let err = TestError::config_error("missing mapper");
        assert_eq!(err.to_string(), "Configuration error: missing mapper");
    }

    #[test]
    fn test_anyhow_conversion_uses_other_variant() {
        let err: TestError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, TestError::Other(ref msg) if msg == "boom"));
    }
}
