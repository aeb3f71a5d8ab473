//! Error types for DCEL construction and finalization.

use thiserror::Error;

/// Errors from building, clipping, or checking an edge list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DcelError {
    /// A splice endpoint already has a successor or predecessor.
    #[error("half-edge is already connected at the splice point")]
    AlreadyConnected,

    /// The two half-edges of a splice belong to different faces.
    #[error("half-edges belong to different faces")]
    FaceMismatch,

    /// A half-edge that must be part of a twin pair has no twin.
    #[error("half-edge has no twin")]
    MissingTwin,

    /// A projection target endpoint was already assigned a vertex.
    #[error("half-edge endpoint is already assigned")]
    EndpointAssigned,

    /// No box side intersects the given ray at `k >= 0` within tolerance.
    #[error("no bounding-box intersection for ray ({x:.3}, {y:.3}) + k*({dx:.3}, {dy:.3})")]
    NoBoundaryIntersection {
        /// Ray origin x.
        x: f64,
        /// Ray origin y.
        y: f64,
        /// Ray direction x.
        dx: f64,
        /// Ray direction y.
        dy: f64,
    },

    /// An open chain endpoint does not lie on the bounding box, so the
    /// boundary walk cannot start or finish there.
    #[error("open chain endpoint ({x:.3}, {y:.3}) does not lie on the bounding box")]
    GapOffBoundary {
        /// Endpoint x.
        x: f64,
        /// Endpoint y.
        y: f64,
    },

    /// A chain endpoint has no vertex although finalization requires one.
    #[error("face chain has an endpoint with no vertex")]
    OpenChainEndpoint,

    /// The clockwise boundary walk failed to close the face ring.
    #[error("boundary walk did not close the face ring")]
    BoundaryWalkStuck,

    /// Walking `next` from a face's head never returns to it.
    #[error("face ring is not a closed cycle")]
    RingNotClosed,

    /// A face ring contains a half-edge recorded under another face.
    #[error("face ring references a half-edge of another face")]
    ForeignHalfEdge,

    /// `twin` links are not mutual.
    #[error("half-edge twin links are asymmetric")]
    TwinAsymmetry,

    /// `next`/`prev` links are not mutual.
    #[error("half-edge prev/next links are asymmetric")]
    LinkAsymmetry,

    /// Twin half-edges claim the same face.
    #[error("twin half-edges share a face")]
    TwinFaceShared,

    /// A half-edge still has no origin vertex after closure.
    #[error("half-edge has no origin vertex after closure")]
    MissingOrigin,

    /// A face has no boundary ring at all after closure.
    #[error("face has no boundary ring")]
    OpenFace,
}
