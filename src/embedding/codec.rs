//! Typed vector validation at the repository boundary
//!
//! Vectors persist as `Vec<f32>` through serde, so encode/store/decode
//! reproduces the identical sequence of numbers. What can still go wrong is
//! a store written under a different embedding-model version (wrong width)
//! or corrupted numeric content; both surface as a decode error on read
//! instead of crashing a similarity computation later.

use crate::errors::{EngineError, Result};

/// Validate a stored vector against the expected dimension and reject
/// non-finite content.
pub fn validate(raw: &[f32], expected_dim: usize) -> Result<()> {
    if raw.len() != expected_dim {
        return Err(EngineError::VectorDecode {
            expected: expected_dim,
            actual: raw.len(),
        });
    }
    if let Some(bad) = raw.iter().find(|v| !v.is_finite()) {
        return Err(EngineError::EmbeddingFailed {
            reason: format!("stored vector contains non-finite value {bad}"),
        });
    }
    Ok(())
}

/// Validate a vector read back from storage against the expected dimension.
/// Returns the vector unchanged on success.
pub fn decode(raw: Vec<f32>, expected_dim: usize) -> Result<Vec<f32>> {
    validate(&raw, expected_dim)?;
    Ok(raw)
}
