//! Finalization of an edge list against the bounding rectangle: projecting
//! still-open half-edges onto the box sides and closing every face ring with
//! synthetic edges along the box.
//!
//! Face rings run clockwise on screen (y grows downward) with the cell
//! interior to the right of each half-edge. The boundary walk therefore
//! moves rightward along the top side, downward along the right side,
//! leftward along the bottom and upward along the left, turning at the
//! corners in that order.

use crate::{DcelError, EdgeList, FaceId, HalfEdgeId, VertexId};
use mapgen_math::{Bounds, Linear2, Point2, Vector2};

/// One side of the bounding rectangle. A corner belongs to the side the
/// clockwise walk continues on: `(0, 0)` to the top, `(W, 0)` to the right,
/// `(W, H)` to the bottom and `(0, H)` to the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Top,
    Right,
    Bottom,
}

fn side_of(p: Point2, bounds: Bounds) -> Option<Side> {
    if p.x == 0.0 && p.y != 0.0 {
        Some(Side::Left)
    } else if p.y == 0.0 && p.x != bounds.width {
        Some(Side::Top)
    } else if p.x == bounds.width && p.y != bounds.height {
        Some(Side::Right)
    } else if p.y == bounds.height && p.x != 0.0 {
        Some(Side::Bottom)
    } else {
        None
    }
}

/// Distance from `from` to `to` walking clockwise along `side`, or `None`
/// when `to` is not ahead on that side. The far corner of the side counts as
/// lying on it, so a stop exactly on a corner is reached without emitting a
/// duplicate corner vertex.
fn distance_ahead(side: Side, from: Point2, to: Point2, bounds: Bounds) -> Option<f64> {
    match side {
        Side::Left if to.x == 0.0 && to.y <= from.y => Some(from.y - to.y),
        Side::Top if to.y == 0.0 && to.x >= from.x => Some(to.x - from.x),
        Side::Right if to.x == bounds.width && to.y >= from.y => Some(to.y - from.y),
        Side::Bottom if to.y == bounds.height && to.x <= from.x => Some(from.x - to.x),
        _ => None,
    }
}

fn next_corner(side: Side, bounds: Bounds) -> Point2 {
    match side {
        Side::Left => Point2::new(0.0, 0.0),
        Side::Top => Point2::new(bounds.width, 0.0),
        Side::Right => Point2::new(bounds.width, bounds.height),
        Side::Bottom => Point2::new(0.0, bounds.height),
    }
}

/// One open chain of a face boundary during the closing walk.
struct Chain {
    head: HalfEdgeId,
    tail: HalfEdgeId,
    start_vertex: VertexId,
    start: Point2,
    end_vertex: VertexId,
    end: Point2,
}

impl EdgeList {
    /// Assign the open endpoint of `he` (the origin of its twin) to a new
    /// vertex on the bounding box.
    ///
    /// The edge is traced by a breakpoint currently at `origin` moving along
    /// `direction`, pointing away from the cell pair. The ray is intersected
    /// with the supporting line of each box side through the linear solver; a
    /// side that yields no unique intersection simply does not stop the ray.
    /// Among the hits with `k >= 0` that land inside the tolerant box the
    /// farthest one is kept: a breakpoint that currently sits outside the box
    /// crosses the boundary twice, and its edge ends where the ray leaves the
    /// box, not where it enters. The chosen point is snapped onto the exact
    /// side values so the closing walk can compare coordinates exactly.
    pub fn project_half_edge_onto_bounds(
        &mut self,
        he: HalfEdgeId,
        origin: Point2,
        direction: Vector2,
        bounds: Bounds,
        tolerance: f64,
    ) -> Result<VertexId, DcelError> {
        let twin = self.half_edges[he].twin.ok_or(DcelError::MissingTwin)?;
        if self.half_edges[twin].origin.is_some() {
            return Err(DcelError::EndpointAssigned);
        }

        let sides: [(Point2, Vector2); 4] = [
            (Point2::new(0.0, 0.0), Vector2::new(0.0, 1.0)),
            (Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0)),
            (Point2::new(bounds.width, bounds.height), Vector2::new(0.0, 1.0)),
            (Point2::new(bounds.width, bounds.height), Vector2::new(1.0, 0.0)),
        ];

        let mut best: Option<(f64, Point2)> = None;
        for (corner, side_dir) in sides {
            let mut sys = Linear2::new();
            sys.set_col(0, direction.x, direction.y);
            sys.set_col(1, -side_dir.x, -side_dir.y);
            sys.set_col(2, origin.x - corner.x, origin.y - corner.y);
            if let Some((k, _)) = sys.solve().unique() {
                if k >= 0.0 {
                    let hit = origin + direction * k;
                    if bounds.contains(hit, tolerance) && best.map_or(true, |(bk, _)| k > bk) {
                        best = Some((k, hit));
                    }
                }
            }
        }

        let (_, hit) = best.ok_or(DcelError::NoBoundaryIntersection {
            x: origin.x,
            y: origin.y,
            dx: direction.x,
            dy: direction.y,
        })?;
        let vertex = self.new_vertex(bounds.snap(hit, tolerance));
        self.half_edges[twin].origin = Some(vertex);
        Ok(vertex)
    }

    /// Close the boundary ring of `face` along the bounding box.
    ///
    /// A face with no edges at all (a single-cell diagram) receives the full
    /// four-corner box ring. Otherwise every open chain of the face is
    /// picked up by a clockwise walk along the box that starts at the end of
    /// the chain holding the face's head, emits synthetic edges to corners
    /// and to the starts of further chains, and finishes by reconnecting to
    /// the head. Cells that touch the box on several disjoint stretches of
    /// its boundary produce several chains; the walk stitches all of them.
    pub fn close_face_with_bounds(&mut self, face: FaceId, bounds: Bounds) -> Result<(), DcelError> {
        let starts: Vec<HalfEdgeId> = self
            .half_edges
            .iter()
            .filter(|(_, h)| h.face == Some(face) && h.prev.is_none())
            .map(|(id, _)| id)
            .collect();

        if starts.is_empty() {
            if self.faces[face].head.is_some() {
                // Ring already closed by the sweep.
                return Ok(());
            }
            return self.emit_box_ring(face, bounds);
        }

        let mut chains = Vec::with_capacity(starts.len());
        for head in starts {
            let tail = self.chain_end(head)?;
            let start_vertex = self.half_edges[head].origin.ok_or(DcelError::OpenChainEndpoint)?;
            let tail_twin = self.half_edges[tail].twin.ok_or(DcelError::MissingTwin)?;
            let end_vertex = self.half_edges[tail_twin].origin.ok_or(DcelError::OpenChainEndpoint)?;
            chains.push(Chain {
                head,
                tail,
                start_vertex,
                start: self.point(start_vertex),
                end_vertex,
                end: self.point(end_vertex),
            });
        }

        let anchor = self
            .faces[face]
            .head
            .and_then(|h| chains.iter().position(|c| c.head == h))
            .unwrap_or(0);
        self.faces[face].head = Some(chains[anchor].head);
        self.faces[face].tail = Some(chains[anchor].tail);

        let target_head = chains[anchor].head;
        let target_vertex = chains[anchor].start_vertex;
        let target = chains[anchor].start;

        let mut cur = chains[anchor].tail;
        let mut end = chains[anchor].end;
        let mut end_vertex = chains[anchor].end_vertex;
        let mut pending: Vec<usize> = (0..chains.len()).filter(|&i| i != anchor).collect();

        // Four corner turns plus one stop per chain is the most a valid walk
        // can take; anything longer means the chain endpoints are broken.
        let mut guard = chains.len() + 6;
        loop {
            if guard == 0 {
                return Err(DcelError::BoundaryWalkStuck);
            }
            guard -= 1;

            let side = side_of(end, bounds).ok_or(DcelError::GapOffBoundary { x: end.x, y: end.y })?;

            // The nearest stop ahead on this side: the start of a pending
            // chain, or the ring target.
            let mut best: Option<(f64, Option<usize>)> = None;
            if let Some(d) = distance_ahead(side, end, target, bounds) {
                best = Some((d, None));
            }
            for &ci in &pending {
                if let Some(d) = distance_ahead(side, end, chains[ci].start, bounds) {
                    if best.map_or(true, |(bd, _)| d <= bd) {
                        best = Some((d, Some(ci)));
                    }
                }
            }

            match best {
                None => {
                    let corner = next_corner(side, bounds);
                    let corner_vertex = self.new_vertex(corner);
                    let edge = self.emit_boundary_edge(face, end_vertex, corner_vertex);
                    self.connect(cur, edge)?;
                    cur = edge;
                    end = corner;
                    end_vertex = corner_vertex;
                }
                Some((d, Some(ci))) => {
                    if d == 0.0 {
                        self.connect(cur, chains[ci].head)?;
                    } else {
                        let edge = self.emit_boundary_edge(face, end_vertex, chains[ci].start_vertex);
                        self.connect(cur, edge)?;
                        self.connect(edge, chains[ci].head)?;
                    }
                    cur = chains[ci].tail;
                    end = chains[ci].end;
                    end_vertex = chains[ci].end_vertex;
                    pending.retain(|&i| i != ci);
                }
                Some((d, None)) => {
                    if d == 0.0 {
                        self.connect(cur, target_head)?;
                    } else {
                        let edge = self.emit_boundary_edge(face, end_vertex, target_vertex);
                        self.connect(cur, edge)?;
                        self.connect(edge, target_head)?;
                    }
                    if !pending.is_empty() {
                        return Err(DcelError::BoundaryWalkStuck);
                    }
                    return Ok(());
                }
            }
        }
    }

    /// A synthetic box edge for `face` from `from` to `to`. The interior
    /// half joins the face ring; the exterior twin carries no face.
    fn emit_boundary_edge(&mut self, face: FaceId, from: VertexId, to: VertexId) -> HalfEdgeId {
        let he = self.new_edge();
        let twin = self.half_edges[he].twin.expect("fresh edge has a twin");
        self.half_edges[he].origin = Some(from);
        self.half_edges[he].face = Some(face);
        self.half_edges[twin].origin = Some(to);
        he
    }

    /// The full box ring for a face with no edges: the four corners joined
    /// clockwise.
    fn emit_box_ring(&mut self, face: FaceId, bounds: Bounds) -> Result<(), DcelError> {
        let corners = [
            Point2::new(0.0, 0.0),
            Point2::new(bounds.width, 0.0),
            Point2::new(bounds.width, bounds.height),
            Point2::new(0.0, bounds.height),
        ];
        let vertices: Vec<VertexId> = corners.iter().map(|&c| self.new_vertex(c)).collect();
        let edges: Vec<HalfEdgeId> = (0..4)
            .map(|i| self.emit_boundary_edge(face, vertices[i], vertices[(i + 1) % 4]))
            .collect();

        self.set_head(face, edges[0]);
        self.insert_after(edges[0], edges[1])?;
        self.insert_after(edges[1], edges[2])?;
        self.insert_after(edges[2], edges[3])?;
        self.connect(edges[3], edges[0])
    }
}
