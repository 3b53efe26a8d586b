use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FaceClusterError, Result};
use crate::region::CropPlan;

/// A face embedding: a fixed-length vector produced by the embedding model.
///
/// Immutable once constructed. Every component is finite and the vector is
/// never empty.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Result<Self> {
        if values.is_empty() {
            return Err(FaceClusterError::InvalidEmbedding("empty vector".into()));
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(FaceClusterError::InvalidEmbedding(format!(
                "component {i} is not finite"
            )));
        }
        Ok(Self(values))
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl TryFrom<Vec<f32>> for Embedding {
    type Error = FaceClusterError;

    fn try_from(values: Vec<f32>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(e: Embedding) -> Self {
        e.0
    }
}

impl fmt::Debug for Embedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Embedding").field("dim", &self.0.len()).finish()
    }
}

/// One detected face at one point in the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Seconds since the start of the stream. Non-decreasing in feed order.
    pub timestamp: f64,

    /// Opaque caller reference to the source image region (e.g. a crop
    /// file name).
    pub label: String,

    /// Where the face crop sits in its source frame, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<CropPlan>,

    pub embedding: Embedding,
}

impl Observation {
    pub fn new(timestamp: f64, label: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            timestamp,
            label: label.into(),
            region: None,
            embedding,
        }
    }

    pub fn with_region(mut self, region: CropPlan) -> Self {
        self.region = Some(region);
        self
    }
}
