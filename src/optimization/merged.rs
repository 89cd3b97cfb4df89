//! Composition of geometry mappings into one joint optimization.
//!
//! A [`MergedMapping`] concatenates the parameter vectors of N component
//! mappings. Sub-ranges (offset + length per component) are computed
//! once at construction and reused for every read, write, and bound
//! validation. Components must mutate disjoint physical quantities:
//! sub-vectors are applied independently and in no guaranteed order.

use crate::error::{Error, Result};
use crate::geometry::Instrument;
use crate::optimization::constraints::ConstraintSet;
use crate::optimization::dispatcher::OptimizerKind;
use crate::optimization::objective::GeometryMapping;

/// One component's slot in the merged vector.
#[derive(Debug, Clone, Copy)]
struct Span {
    offset: usize,
    length: usize,
}

/// N geometry mappings presented as a single mapping over the
/// concatenation of their parameter vectors.
pub struct MergedMapping {
    components: Vec<Box<dyn GeometryMapping>>,
    spans: Vec<Span>,
    dimensions: usize,
    kind: OptimizerKind,
}

impl MergedMapping {
    pub fn new(components: Vec<Box<dyn GeometryMapping>>) -> Self {
        let mut spans = Vec::with_capacity(components.len());
        let mut offset = 0;
        for component in &components {
            let length = component.dimensions();
            spans.push(Span { offset, length });
            offset += length;
        }
        Self {
            components,
            spans,
            dimensions: offset,
            kind: OptimizerKind::TrustRegion,
        }
    }

    /// Override the backend hint (defaults to the trust-region method).
    pub fn with_optimizer_kind(mut self, kind: OptimizerKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// The merged-vector range owned by component `index`.
    pub fn component_range(&self, index: usize) -> std::ops::Range<usize> {
        let span = self.spans[index];
        span.offset..span.offset + span.length
    }

    fn slice<'a>(&self, point: &'a [f64], index: usize) -> &'a [f64] {
        let span = self.spans[index];
        &point[span.offset..span.offset + span.length]
    }
}

impl GeometryMapping for MergedMapping {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn read(&self, instrument: &Instrument) -> Vec<f64> {
        let mut point = Vec::with_capacity(self.dimensions);
        for component in &self.components {
            point.extend(component.read(instrument));
        }
        point
    }

    fn write(&self, instrument: &mut Instrument, point: &[f64]) -> Result<()> {
        if point.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: point.len(),
            });
        }
        for (index, component) in self.components.iter().enumerate() {
            component.write(instrument, self.slice(point, index))?;
        }
        Ok(())
    }

    fn constraints(&self) -> ConstraintSet {
        let mut merged = ConstraintSet::default();
        for component in &self.components {
            merged.extend(component.constraints());
        }
        merged
    }

    fn optimizer_kind(&self) -> OptimizerKind {
        self.kind
    }

    fn validate_lower_bounds(&self, instrument: &Instrument, bounds: &[f64]) -> Result<()> {
        if bounds.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: bounds.len(),
            });
        }
        // Re-propagate each sub-slice to its owning component so domain
        // floors keep applying under composition.
        for (index, component) in self.components.iter().enumerate() {
            component.validate_lower_bounds(instrument, self.slice(bounds, index))?;
        }
        Ok(())
    }
}
