//! Per-field configuration for vector attributes
//!
//! A [`VectorFieldSpec`] is declared once per vector-bearing attribute of
//! an entity type and is immutable after declaration. Defaults follow the
//! common IVF_FLAT / L2 setup (nlist 1024, nprobe 32).

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};

/// Element type of a vector field
///
/// Only F32 is supported initially; the vector service stores float
/// vectors as 32-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ElementType {
    /// 32-bit floating point (default)
    #[default]
    F32,
}

/// Distance metric for similarity search
///
/// Lower distance means nearer; search results are ordered nearest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Euclidean (L2) distance
    #[default]
    Euclidean,
    /// Inner product; meaningful for pre-normalized embeddings
    InnerProduct,
}

impl DistanceMetric {
    /// Human-readable name for display and service calls
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "l2",
            DistanceMetric::InnerProduct => "ip",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "l2" | "euclidean" => Some(DistanceMetric::Euclidean),
            "ip" | "inner_product" | "dot" => Some(DistanceMetric::InnerProduct),
            _ => None,
        }
    }
}

/// Index algorithm family for a vector field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexKind {
    /// Inverted file with flat (exact) residuals
    #[default]
    IvfFlat,
    /// Inverted file with 8-bit scalar quantization
    IvfSq8,
    /// Graph-based index
    Hnsw,
}

impl IndexKind {
    /// Human-readable name for display and service calls
    pub fn name(&self) -> &'static str {
        match self {
            IndexKind::IvfFlat => "ivf_flat",
            IndexKind::IvfSq8 => "ivf_sq8",
            IndexKind::Hnsw => "hnsw",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ivf_flat" => Some(IndexKind::IvfFlat),
            "ivf_sq8" => Some(IndexKind::IvfSq8),
            "hnsw" => Some(IndexKind::Hnsw),
            _ => None,
        }
    }
}

/// Algorithm tuning parameters
///
/// For the IVF family `nlist` is the partition count at build time and
/// `nprobe` the number of partitions probed per search. Graph indexes
/// reuse the pair as build-time and search-time candidate-list sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexParams {
    /// Build-time partition / candidate-list count
    pub nlist: u32,
    /// Search-time probe / candidate-list count
    pub nprobe: u32,
}

impl Default for IndexParams {
    fn default() -> Self {
        IndexParams {
            nlist: 1024,
            nprobe: 32,
        }
    }
}

/// Declaration of one vector-valued attribute of an entity type
///
/// Immutable after declaration; changing any of these requires a rebuild
/// of the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorFieldSpec {
    /// Attribute name; also the field name in the collection
    pub name: String,
    /// Fixed dimensionality of the vector value
    pub dim: usize,
    /// Element numeric type
    pub element: ElementType,
    /// Distance metric for this field's searches
    pub metric: DistanceMetric,
    /// Index algorithm family
    pub index: IndexKind,
    /// Algorithm tuning parameters
    pub params: IndexParams,
}

impl VectorFieldSpec {
    /// Declare a field with default element type, metric, index and params
    pub fn new(name: impl Into<String>, dim: usize) -> Self {
        VectorFieldSpec {
            name: name.into(),
            dim,
            element: ElementType::default(),
            metric: DistanceMetric::default(),
            index: IndexKind::default(),
            params: IndexParams::default(),
        }
    }

    /// Override the distance metric
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Override the index algorithm
    pub fn with_index(mut self, index: IndexKind) -> Self {
        self.index = index;
        self
    }

    /// Override the tuning parameters
    pub fn with_params(mut self, params: IndexParams) -> Self {
        self.params = params;
        self
    }

    /// Validate the declaration
    ///
    /// # Errors
    /// `Configuration` if the name is empty or the dimensionality is zero.
    pub fn validate(&self) -> BridgeResult<()> {
        if self.name.is_empty() {
            return Err(BridgeError::Configuration {
                detail: "vector field name cannot be empty".to_string(),
            });
        }
        if self.dim == 0 {
            return Err(BridgeError::Configuration {
                detail: format!("vector field '{}' has dimensionality 0", self.name),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_ivf_flat_l2() {
        let spec = VectorFieldSpec::new("similarity", 2);
        assert_eq!(spec.metric, DistanceMetric::Euclidean);
        assert_eq!(spec.index, IndexKind::IvfFlat);
        assert_eq!(spec.params.nlist, 1024);
        assert_eq!(spec.params.nprobe, 32);
        assert_eq!(spec.element, ElementType::F32);
    }

    #[test]
    fn test_metric_parse_and_name() {
        assert_eq!(DistanceMetric::parse("L2"), Some(DistanceMetric::Euclidean));
        assert_eq!(
            DistanceMetric::parse("euclidean"),
            Some(DistanceMetric::Euclidean)
        );
        assert_eq!(
            DistanceMetric::parse("IP"),
            Some(DistanceMetric::InnerProduct)
        );
        assert_eq!(DistanceMetric::parse("hamming"), None);
        assert_eq!(DistanceMetric::Euclidean.name(), "l2");
    }

    #[test]
    fn test_index_kind_parse_and_name() {
        assert_eq!(IndexKind::parse("IVF_FLAT"), Some(IndexKind::IvfFlat));
        assert_eq!(IndexKind::parse("hnsw"), Some(IndexKind::Hnsw));
        assert_eq!(IndexKind::parse("annoy"), None);
        assert_eq!(IndexKind::IvfSq8.name(), "ivf_sq8");
    }

    #[test]
    fn test_validate_rejects_zero_dim() {
        let err = VectorFieldSpec::new("similarity", 0).validate().unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        assert!(VectorFieldSpec::new("", 2).validate().is_err());
    }

    #[test]
    fn test_builder_overrides() {
        let spec = VectorFieldSpec::new("embedding", 768)
            .with_metric(DistanceMetric::InnerProduct)
            .with_index(IndexKind::Hnsw)
            .with_params(IndexParams {
                nlist: 64,
                nprobe: 8,
            });
        assert_eq!(spec.metric, DistanceMetric::InnerProduct);
        assert_eq!(spec.index, IndexKind::Hnsw);
        assert_eq!(spec.params.nlist, 64);
    }
}
