#![warn(missing_docs)]

//! Fortune sweep-line Voronoi diagrams, clipped to a bounding rectangle.
//!
//! Given a set of sites strictly inside `[0, W] x [0, H]`, the generator
//! sweeps a horizontal line down the box, maintaining a beachline of
//! parabola arcs and an event queue of site and circle events, and emits a
//! doubly connected edge list: one face per site in input order, half-edge
//! twin pairs along every Voronoi edge, and synthetic edges along the box
//! sides and corners closing every cell. Construction is single-threaded,
//! one-shot and deterministic for a given input.
//!
//! # Example
//!
//! ```
//! use mapgen_voronoi::{create_voronoi_diagram, EdgeList, Point2};
//!
//! let sites = [Point2::new(300.0, 500.0), Point2::new(700.0, 500.0)];
//! let mut diagram = EdgeList::new();
//! create_voronoi_diagram(&mut diagram, &sites, 1000.0, 1000.0)?;
//! assert_eq!(diagram.num_faces(), 2);
//! # Ok::<(), mapgen_voronoi::VoronoiError>(())
//! ```

mod beachline;
mod event;
mod sweep;

pub use mapgen_dcel::{print_edge_list, DcelError, EdgeList};
pub use mapgen_math::Point2;

use mapgen_math::Bounds;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric configuration of a diagram construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagramConfig {
    /// The single tolerance used everywhere a coordinate is compared
    /// against the box: snapping near-side vertices onto the sides,
    /// accepting box intersections, and rejecting sites that sit on the
    /// boundary.
    pub tolerance: f64,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self { tolerance: 1e-3 }
    }
}

/// Errors from Voronoi diagram construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VoronoiError {
    /// Width or height of the bounding box is not positive.
    #[error("diagram bounds must be positive, got {width} x {height}")]
    InvalidBounds {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },

    /// No sites were supplied.
    #[error("at least one site is required")]
    NoSites,

    /// The output edge list already contains entities.
    #[error("the output edge list must be empty")]
    OutputNotEmpty,

    /// A site lies outside the box or within tolerance of its boundary.
    #[error("site ({x}, {y}) lies outside the bounding box or on its boundary")]
    SiteOutOfBounds {
        /// Site x.
        x: f64,
        /// Site y.
        y: f64,
    },

    /// Two supplied sites coincide.
    #[error("duplicate site ({x}, {y})")]
    DuplicateSite {
        /// Site x.
        x: f64,
        /// Site y.
        y: f64,
    },

    /// The beachline lost one of its structural invariants; this is a bug,
    /// surfaced as an error rather than a crash.
    #[error("beachline structure is corrupt: {0}")]
    CorruptBeachline(&'static str),

    /// An edge-list operation failed.
    #[error(transparent)]
    Dcel(#[from] DcelError),
}

/// Construct the Voronoi diagram of `sites` clipped to `[0, width] x
/// [0, height]`, writing it into the empty edge list `out`.
///
/// Faces are created in site order, so `out.faces_in_order()` matches the
/// input. On failure `out` may hold a partially built diagram; dropping it
/// releases everything.
pub fn create_voronoi_diagram(
    out: &mut EdgeList,
    sites: &[Point2],
    width: f64,
    height: f64,
) -> Result<(), VoronoiError> {
    create_voronoi_diagram_with(&DiagramConfig::default(), out, sites, width, height)
}

/// [`create_voronoi_diagram`] with an explicit configuration.
pub fn create_voronoi_diagram_with(
    config: &DiagramConfig,
    out: &mut EdgeList,
    sites: &[Point2],
    width: f64,
    height: f64,
) -> Result<(), VoronoiError> {
    if !(width > 0.0 && height > 0.0) {
        return Err(VoronoiError::InvalidBounds { width, height });
    }
    if !out.is_empty() {
        return Err(VoronoiError::OutputNotEmpty);
    }
    let mut sweep = sweep::Sweep::new(out, Bounds::new(width, height), config.tolerance);
    sweep.seed(sites)?;
    sweep.run()
}
