#![warn(missing_docs)]

//! Planar math primitives for the mapgen Voronoi kernel.
//!
//! Everything in here works in diagram coordinates: `x` grows to the right,
//! `y` grows downward, and the sweep line moves toward larger `y`. The
//! modules are small and independent:
//!
//! - [`linear`]: a 2-equation / 2-unknown linear system solver used for
//!   ray/ray and ray/box-side intersections
//! - [`parabola`]: the beachline arc geometry (focus + directrix) and the
//!   breakpoint abscissa between two adjacent arcs
//! - [`predicates`]: the orientation sign and the circumscribed circle of a
//!   site triple
//! - [`bounds`]: the axis-aligned clipping rectangle `[0, W] x [0, H]`

pub mod bounds;
pub mod linear;
pub mod parabola;
pub mod predicates;

pub use bounds::Bounds;
pub use linear::{Linear2, Solution2};
pub use parabola::{breakpoint_x, Parabola};
pub use predicates::{circumcircle, orient2d, Sign};

/// A point in diagram coordinates.
pub type Point2 = nalgebra::Point2<f64>;

/// A displacement in diagram coordinates.
pub type Vector2 = nalgebra::Vector2<f64>;
