pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use traits::EmbeddingGenerator;
