//! Centralized configuration management for textsearch
//!
//! Configuration follows a simple hierarchy:
//! 1. Safe defaults (defined as constants)
//! 2. Optional TOML file
//! 3. Environment variable overrides
//! 4. Runtime validation

pub mod error;
pub mod source;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use source::{ConfigurationLoader, ConfigurationSource, EnvironmentSource, TomlFileSource};

use textsearch_common::TracingOptions;
use validation::Validate;

// =============================================================================
// SAFE DEFAULTS
// =============================================================================

// Search Configuration
pub const DEFAULT_SEARCH_TOP: usize = 5;
const DEFAULT_SEARCH_MAX_TOP: usize = 1000;
const DEFAULT_SEARCH_INCLUDE_TOTAL_COUNT: bool = false; // Exact counts cost a backend round trip
const DEFAULT_SEARCH_SKIP_MAPPING_ERRORS: bool = false; // Propagate and stop

// Embedding Configuration
const DEFAULT_EMBEDDING_MODEL_ID: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

// Vector Storage Configuration
const DEFAULT_VECTOR_COLLECTION_NAME: &str = "textsearch";
const DEFAULT_VECTOR_PAGE_SIZE: usize = 100;

// Telemetry Configuration
const DEFAULT_TRACING_LEVEL: &str = "info";
const DEFAULT_LOG_JSON: bool = false;
const DEFAULT_TELEMETRY_SERVICE_NAME: &str = "textsearch";

/// Read and parse an environment variable, ignoring unparsable values
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Core configuration for a textsearch deployment
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Projection and paging defaults
    pub search: SearchConfig,

    /// Embedding generation configuration
    pub embedding: EmbeddingConfig,

    /// Vector storage configuration
    pub vector_storage: VectorStorageConfig,

    /// Logging configuration
    pub telemetry: TelemetryConfig,
}

/// Search defaults applied by the projector when a caller omits options
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of results requested when the caller passes no options
    pub default_top: usize,

    /// Largest `top` a caller may request; larger requests are rejected
    pub max_top: usize,

    /// Ask the backend for an exact total count by default
    pub include_total_count: bool,

    /// Skip records that fail to map instead of ending the stream
    pub skip_mapping_errors: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top: DEFAULT_SEARCH_TOP,
            max_top: DEFAULT_SEARCH_MAX_TOP,
            include_total_count: DEFAULT_SEARCH_INCLUDE_TOTAL_COUNT,
            skip_mapping_errors: DEFAULT_SEARCH_SKIP_MAPPING_ERRORS,
        }
    }
}

impl SearchConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    #[must_use]
    fn with_env_overrides(self) -> Self {
        Self {
            default_top: env_parse("TEXTSEARCH_SEARCH_DEFAULT_TOP").unwrap_or(self.default_top),
            max_top: env_parse("TEXTSEARCH_SEARCH_MAX_TOP").unwrap_or(self.max_top),
            include_total_count: env_parse("TEXTSEARCH_SEARCH_INCLUDE_TOTAL_COUNT")
                .unwrap_or(self.include_total_count),
            skip_mapping_errors: env_parse("TEXTSEARCH_SEARCH_SKIP_MAPPING_ERRORS")
                .unwrap_or(self.skip_mapping_errors),
        }
    }
}

impl Validate for SearchConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_range(self.max_top as u64, 1, 100_000, "search.max_top")?;
        validation::validate_range(
            self.default_top as u64,
            1,
            self.max_top as u64,
            "search.default_top",
        )?;
        Ok(())
    }
}

/// Embedding model configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Model identifier passed to the embedding service
    pub model_id: String,

    /// Dimensions produced by the model; must match vector storage
    pub dimensions: usize,

    /// Remote embedding endpoint, when the generator is an HTTP service
    pub endpoint: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_EMBEDDING_MODEL_ID.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            endpoint: None,
        }
    }
}

impl EmbeddingConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    #[must_use]
    fn with_env_overrides(self) -> Self {
        Self {
            model_id: std::env::var("TEXTSEARCH_EMBEDDING_MODEL").unwrap_or(self.model_id),
            dimensions: env_parse("TEXTSEARCH_EMBEDDING_DIMENSION").unwrap_or(self.dimensions),
            endpoint: std::env::var("TEXTSEARCH_EMBEDDING_ENDPOINT")
                .ok()
                .or(self.endpoint),
        }
    }
}

impl Validate for EmbeddingConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_non_empty(&self.model_id, "embedding.model_id")?;
        validation::validate_range(self.dimensions as u64, 1, 10_000, "embedding.dimensions")?;
        if let Some(endpoint) = &self.endpoint {
            validation::validate_url(endpoint)?;
        }
        Ok(())
    }
}

/// Vector storage configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VectorStorageConfig {
    /// Collection name
    pub collection_name: String,

    /// Vector dimensions
    pub vector_dimension: usize,

    /// Records fetched per backend round trip
    pub page_size: usize,
}

impl Default for VectorStorageConfig {
    fn default() -> Self {
        Self {
            collection_name: DEFAULT_VECTOR_COLLECTION_NAME.to_string(),
            vector_dimension: DEFAULT_EMBEDDING_DIMENSIONS,
            page_size: DEFAULT_VECTOR_PAGE_SIZE,
        }
    }
}

impl VectorStorageConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    #[must_use]
    fn with_env_overrides(self) -> Self {
        Self {
            collection_name: std::env::var("TEXTSEARCH_VECTOR_COLLECTION_NAME")
                .unwrap_or(self.collection_name),
            vector_dimension: env_parse("TEXTSEARCH_VECTOR_DIMENSION")
                .unwrap_or(self.vector_dimension),
            page_size: env_parse("TEXTSEARCH_VECTOR_PAGE_SIZE").unwrap_or(self.page_size),
        }
    }
}

impl Validate for VectorStorageConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_non_empty(&self.collection_name, "vector_storage.collection_name")?;
        validation::validate_range(
            self.vector_dimension as u64,
            1,
            10_000,
            "vector_storage.vector_dimension",
        )?;
        validation::validate_range(self.page_size as u64, 1, 10_000, "vector_storage.page_size")?;
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Tracing level (trace, debug, info, warn, error)
    pub tracing_level: String,

    /// Emit JSON log lines
    pub json_logs: bool,

    /// Service name attached to log output
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            tracing_level: DEFAULT_TRACING_LEVEL.to_string(),
            json_logs: DEFAULT_LOG_JSON,
            service_name: DEFAULT_TELEMETRY_SERVICE_NAME.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    #[must_use]
    fn with_env_overrides(self) -> Self {
        Self {
            tracing_level: std::env::var("TEXTSEARCH_LOG_LEVEL").unwrap_or(self.tracing_level),
            json_logs: env_parse("TEXTSEARCH_LOG_JSON").unwrap_or(self.json_logs),
            service_name: std::env::var("TEXTSEARCH_SERVICE_NAME").unwrap_or(self.service_name),
        }
    }

    /// Options for `textsearch_common::init_tracing`
    pub fn tracing_options(&self) -> TracingOptions {
        TracingOptions {
            default_level: self.tracing_level.to_lowercase(),
            json: self.json_logs,
        }
    }
}

impl Validate for TelemetryConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_non_empty(&self.service_name, "telemetry.service_name")?;

        match self.tracing_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::InvalidTracingLevel {
                level: self.tracing_level.clone(),
            }),
        }
    }
}

impl ApplicationConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `TEXTSEARCH_*` environment overrides on top of this configuration
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        Self {
            search: self.search.with_env_overrides(),
            embedding: self.embedding.with_env_overrides(),
            vector_storage: self.vector_storage.with_env_overrides(),
            telemetry: self.telemetry.with_env_overrides(),
        }
    }
}

impl Validate for ApplicationConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.search.validate()?;
        self.embedding.validate()?;
        self.vector_storage.validate()?;
        self.telemetry.validate()?;

        if self.embedding.dimensions != self.vector_storage.vector_dimension {
            return Err(ConfigError::DimensionMismatch {
                embedding: self.embedding.dimensions,
                storage: self.vector_storage.vector_dimension,
            });
        }

        Ok(())
    }
}
