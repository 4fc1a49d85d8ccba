//! Geometry snapshots
//!
//! A [`GeometrySnapshot`] is the result of one measurement pass. It is
//! immutable once built; the engine swaps in a new one per pass.

use crate::geometry::Rect;
use indexmap::IndexMap;
use roadmap_model::StepId;

/// Card rectangles relative to the container, captured at one instant
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometrySnapshot {
    container_width: f64,
    container_height: f64,
    rects: IndexMap<StepId, Rect>,
}

impl GeometrySnapshot {
    /// Snapshot with no measurements
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble from container size and per-step rectangles
    ///
    /// Rectangles must already be container-relative.
    #[must_use]
    pub fn new(container_width: f64, container_height: f64, rects: IndexMap<StepId, Rect>) -> Self {
        Self {
            container_width,
            container_height,
            rects,
        }
    }

    /// Container inner width used for the axis
    #[inline]
    #[must_use]
    pub fn container_width(&self) -> f64 {
        self.container_width
    }

    /// Container height
    #[inline]
    #[must_use]
    pub fn container_height(&self) -> f64 {
        self.container_height
    }

    /// Rectangle for a step, if measured
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rect> {
        self.rects.get(id)
    }

    /// Check if a step was measured
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.rects.contains_key(id)
    }

    /// Measured step ids in visible order
    pub fn ids(&self) -> impl Iterator<Item = &StepId> {
        self.rects.keys()
    }

    /// Measured entries in visible order
    pub fn iter(&self) -> impl Iterator<Item = (&StepId, &Rect)> {
        self.rects.iter()
    }

    /// Number of measured steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Check if nothing was measured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Copy keeping only the steps in `visible`, in that order
    #[must_use]
    pub fn restricted_to(&self, visible: &[StepId]) -> Self {
        let rects = visible
            .iter()
            .filter_map(|id| Some((id.clone(), *self.rects.get(id)?)))
            .collect();
        Self {
            container_width: self.container_width,
            container_height: self.container_height,
            rects,
        }
    }

    /// Compare with another snapshot allowing `epsilon` of float drift
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= epsilon;
        close(self.container_width, other.container_width)
            && close(self.container_height, other.container_height)
            && self.rects.len() == other.rects.len()
            && self.rects.iter().zip(other.rects.iter()).all(|((ia, a), (ib, b))| {
                ia == ib
                    && close(a.x, b.x)
                    && close(a.y, b.y)
                    && close(a.width, b.width)
                    && close(a.height, b.height)
            })
    }
}
