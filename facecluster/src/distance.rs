use crate::error::{FaceClusterError, Result};

/// A dissimilarity score between two embeddings.
///
/// Implementations must be symmetric, non-negative and return 0 for
/// identical inputs. [`Distance::eval`] may assume both slices have the same
/// length; [`Distance::distance`] checks it first.
pub trait Distance: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Computes the distance between two equal-length vectors.
    fn eval(&self, a: &[f32], b: &[f32]) -> f32;

    /// Computes the distance, rejecting vectors of different dimensions.
    fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        if a.len() != b.len() {
            return Err(FaceClusterError::DimensionMismatch {
                expected: a.len(),
                got: b.len(),
            });
        }
        Ok(self.eval(a, b))
    }
}

/// Euclidean (L2) distance. This is the metric face encodings are trained
/// against, so it is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Distance for Euclidean {
    fn name(&self) -> &'static str {
        "euclidean"
    }

    /// Uses f64 intermediate precision.
    fn eval(&self, a: &[f32], b: &[f32]) -> f32 {
        let mut sum: f64 = 0.0;
        for (&x, &y) in a.iter().zip(b) {
            let d = x as f64 - y as f64;
            sum += d * d;
        }
        sum.sqrt() as f32
    }
}

/// Cosine distance: `1 - cosine_similarity`, in `[0, 2]`.
///
/// Identical vectors are at distance exactly 0. Zero vectors are treated as
/// maximally distant from everything except another zero vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cosine;

impl Distance for Cosine {
    fn name(&self) -> &'static str {
        "cosine"
    }

    fn eval(&self, a: &[f32], b: &[f32]) -> f32 {
        if a == b {
            return 0.0;
        }
        let mut dot: f64 = 0.0;
        let mut na: f64 = 0.0;
        let mut nb: f64 = 0.0;
        for (&x, &y) in a.iter().zip(b) {
            let (x, y) = (x as f64, y as f64);
            dot += x * y;
            na += x * x;
            nb += y * y;
        }
        if na == 0.0 && nb == 0.0 {
            return 0.0;
        }
        let denom = na.sqrt() * nb.sqrt();
        if denom == 0.0 {
            return 2.0;
        }
        // Clamp to [-1, 1] to absorb rounding.
        let sim = (dot / denom).clamp(-1.0, 1.0);
        (1.0 - sim) as f32
    }
}

/// Euclidean distance between two embeddings of the same dimension.
pub fn euclidean(a: &[f32], b: &[f32]) -> Result<f32> {
    Euclidean.distance(a, b)
}
