#![warn(missing_docs)]

//! Doubly connected edge list (DCEL) for box-clipped planar subdivisions.
//!
//! Arena-based (slotmap) half-edge data structure: vertices, half-edges and
//! faces live in generation-tagged arenas and reference each other through
//! small key handles, never through owning pointers. Twin pairs represent
//! undirected edges; each face keeps `head`/`tail` handles that bracket the
//! part of its boundary ring known so far. While a face is under
//! construction its boundary is an open chain (or several); after
//! finalization `head == tail.next` and the ring is a closed cycle.
//!
//! Finalization against the bounding rectangle lives in [`clip`]: projecting
//! still-open half-edges onto the box and closing every face ring along the
//! box sides and corners.
//!
//! The whole arena is released at once when the [`EdgeList`] drops; there is
//! no per-entity free during construction.

mod clip;
mod error;

pub use error::DcelError;

use mapgen_math::Point2;
use slotmap::{new_key_type, SlotMap};
use std::fmt;

new_key_type! {
    /// Handle for a vertex of the subdivision.
    pub struct VertexId;
    /// Handle for a half-edge of the subdivision.
    pub struct HalfEdgeId;
    /// Handle for a face (one Voronoi cell) of the subdivision.
    pub struct FaceId;
}

/// A vertex — a point where edges meet, or a point on the bounding box.
/// Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in diagram coordinates.
    pub point: Point2,
}

/// One direction of an edge. Created in twin pairs; `origin` stays `None`
/// while the edge end is still being traced by the sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HalfEdge {
    /// The vertex this half-edge leaves from.
    pub origin: Option<VertexId>,
    /// The opposite-direction half-edge of the same undirected edge.
    pub twin: Option<HalfEdgeId>,
    /// The face on whose ring this half-edge lies. `None` for the exterior
    /// side of a synthetic box edge.
    pub face: Option<FaceId>,
    /// Predecessor on the face ring.
    pub prev: Option<HalfEdgeId>,
    /// Successor on the face ring.
    pub next: Option<HalfEdgeId>,
}

/// A face — one cell of the subdivision, owning the site it was grown from
/// and the `head`/`tail` brackets of its boundary chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// The site this cell belongs to.
    pub site: Point2,
    /// First half-edge of the known boundary chain.
    pub head: Option<HalfEdgeId>,
    /// Last half-edge of the known boundary chain.
    pub tail: Option<HalfEdgeId>,
}

/// The edge list: arenas for all vertices, half-edges and faces, plus the
/// list of faces in insertion order.
#[derive(Debug, Clone, Default)]
pub struct EdgeList {
    /// Vertex arena.
    pub vertices: SlotMap<VertexId, Vertex>,
    /// Half-edge arena.
    pub half_edges: SlotMap<HalfEdgeId, HalfEdge>,
    /// Face arena.
    pub faces: SlotMap<FaceId, Face>,
    face_order: Vec<FaceId>,
}

impl EdgeList {
    /// Create an empty edge list.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the edge list holds no entities at all.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.half_edges.is_empty() && self.faces.is_empty()
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edges (twice the number of undirected edges).
    pub fn num_half_edges(&self) -> usize {
        self.half_edges.len()
    }

    /// Number of faces.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    // =========================================================================
    // Entity creation
    // =========================================================================

    /// Insert a vertex at `point`.
    pub fn new_vertex(&mut self, point: Point2) -> VertexId {
        self.vertices.insert(Vertex { point })
    }

    /// Insert a bare half-edge with no twin linkage.
    pub fn new_half_edge(&mut self) -> HalfEdgeId {
        self.half_edges.insert(HalfEdge::default())
    }

    /// Insert a twin pair of half-edges and return one half; the other is
    /// reachable through `twin`.
    pub fn new_edge(&mut self) -> HalfEdgeId {
        let he = self.new_half_edge();
        let tw = self.new_half_edge();
        self.half_edges[he].twin = Some(tw);
        self.half_edges[tw].twin = Some(he);
        he
    }

    /// Insert a face for `site` at the tail of the face list.
    pub fn new_face(&mut self, site: Point2) -> FaceId {
        let id = self.faces.insert(Face {
            site,
            head: None,
            tail: None,
        });
        self.face_order.push(id);
        id
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Faces in insertion order.
    pub fn faces_in_order(&self) -> &[FaceId] {
        &self.face_order
    }

    /// The twin of `he`, if linked.
    pub fn twin(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        self.half_edges[he].twin
    }

    /// The destination vertex of `he`: the origin of its twin.
    pub fn destination(&self, he: HalfEdgeId) -> Option<VertexId> {
        self.half_edges[he].twin.and_then(|t| self.half_edges[t].origin)
    }

    /// Position of a vertex.
    pub fn point(&self, v: VertexId) -> Point2 {
        self.vertices[v].point
    }

    /// Iterate the boundary ring of `face`, starting at its head. Stops at an
    /// open chain end, or after one full cycle.
    pub fn ring(&self, face: FaceId) -> RingIter<'_> {
        let head = self.faces[face].head;
        RingIter {
            el: self,
            start: head,
            current: head,
            started: false,
            remaining: self.half_edges.len(),
        }
    }

    // =========================================================================
    // Ring splicing
    // =========================================================================

    /// Prepend `he` to the boundary chain of `face`. The chain may be empty.
    pub fn set_head(&mut self, face: FaceId, he: HalfEdgeId) {
        debug_assert!(self.half_edges[he].next.is_none());
        debug_assert!(self.half_edges[he].prev.is_none());
        self.half_edges[he].face = Some(face);
        let old_head = self.faces[face].head;
        if let Some(old) = old_head {
            self.half_edges[he].next = Some(old);
            self.half_edges[old].prev = Some(he);
        } else {
            self.faces[face].tail = Some(he);
        }
        self.faces[face].head = Some(he);
    }

    /// Append `he` to the boundary chain of `face`. The chain may be empty.
    pub fn set_tail(&mut self, face: FaceId, he: HalfEdgeId) {
        debug_assert!(self.half_edges[he].next.is_none());
        debug_assert!(self.half_edges[he].prev.is_none());
        self.half_edges[he].face = Some(face);
        let old_tail = self.faces[face].tail;
        if let Some(old) = old_tail {
            self.half_edges[he].prev = Some(old);
            self.half_edges[old].next = Some(he);
        } else {
            self.faces[face].head = Some(he);
        }
        self.faces[face].tail = Some(he);
    }

    /// Splice `he` into the ring directly after `pos`, keeping the face's
    /// `tail` bracket correct when `pos` was the chain end.
    pub fn insert_after(&mut self, pos: HalfEdgeId, he: HalfEdgeId) -> Result<(), DcelError> {
        let (pos_next, pos_face) = {
            let p = &self.half_edges[pos];
            (p.next, p.face)
        };
        let h = &self.half_edges[he];
        if h.prev.is_some() || h.next.is_some() {
            return Err(DcelError::AlreadyConnected);
        }
        if h.face.is_some() && h.face != pos_face {
            return Err(DcelError::FaceMismatch);
        }
        self.half_edges[he].face = pos_face;
        self.half_edges[he].prev = Some(pos);
        self.half_edges[he].next = pos_next;
        self.half_edges[pos].next = Some(he);
        if let Some(n) = pos_next {
            self.half_edges[n].prev = Some(he);
        }
        if let Some(f) = pos_face {
            if self.faces[f].tail == Some(pos) {
                self.faces[f].tail = Some(he);
            }
        }
        Ok(())
    }

    /// Splice `he` into the ring directly before `pos`, keeping the face's
    /// `head` bracket correct when `pos` was the chain start.
    pub fn insert_before(&mut self, pos: HalfEdgeId, he: HalfEdgeId) -> Result<(), DcelError> {
        let (pos_prev, pos_face) = {
            let p = &self.half_edges[pos];
            (p.prev, p.face)
        };
        let h = &self.half_edges[he];
        if h.prev.is_some() || h.next.is_some() {
            return Err(DcelError::AlreadyConnected);
        }
        if h.face.is_some() && h.face != pos_face {
            return Err(DcelError::FaceMismatch);
        }
        self.half_edges[he].face = pos_face;
        self.half_edges[he].next = Some(pos);
        self.half_edges[he].prev = pos_prev;
        self.half_edges[pos].prev = Some(he);
        if let Some(p) = pos_prev {
            self.half_edges[p].next = Some(he);
        }
        if let Some(f) = pos_face {
            if self.faces[f].head == Some(pos) {
                self.faces[f].head = Some(he);
            }
        }
        Ok(())
    }

    /// Link `first.next = second` and `second.prev = first`.
    ///
    /// Both half-edges must belong to the same face and be open at the splice
    /// point. The face's `head`/`tail` brackets are maintained: when the link
    /// extends the tracked chain at either end, the bracket follows the
    /// spliced fragment to its far end. Linking the tracked tail to the
    /// tracked head closes the ring and leaves both brackets alone.
    pub fn connect(&mut self, first: HalfEdgeId, second: HalfEdgeId) -> Result<(), DcelError> {
        let first_face = self.half_edges[first].face;
        let second_face = self.half_edges[second].face;
        if self.half_edges[first].next.is_some() || self.half_edges[second].prev.is_some() {
            return Err(DcelError::AlreadyConnected);
        }
        if first_face != second_face {
            return Err(DcelError::FaceMismatch);
        }

        self.half_edges[first].next = Some(second);
        self.half_edges[second].prev = Some(first);

        if let Some(f) = first_face {
            let head = self.faces[f].head;
            let tail = self.faces[f].tail;
            if head == Some(second) && tail != Some(first) {
                self.faces[f].head = Some(self.chain_start(first)?);
            }
            if tail == Some(first) && head != Some(second) {
                self.faces[f].tail = Some(self.chain_end(second)?);
            }
        }
        Ok(())
    }

    /// First half-edge of the open chain containing `he`.
    fn chain_start(&self, he: HalfEdgeId) -> Result<HalfEdgeId, DcelError> {
        let mut cur = he;
        let mut steps = 0;
        while let Some(p) = self.half_edges[cur].prev {
            cur = p;
            steps += 1;
            if steps > self.half_edges.len() {
                return Err(DcelError::RingNotClosed);
            }
        }
        Ok(cur)
    }

    /// Last half-edge of the open chain containing `he`.
    fn chain_end(&self, he: HalfEdgeId) -> Result<HalfEdgeId, DcelError> {
        let mut cur = he;
        let mut steps = 0;
        while let Some(n) = self.half_edges[cur].next {
            cur = n;
            steps += 1;
            if steps > self.half_edges.len() {
                return Err(DcelError::RingNotClosed);
            }
        }
        Ok(cur)
    }

    // =========================================================================
    // Integrity checks
    // =========================================================================

    /// Check the structural invariants of a finalized edge list: mutual twin
    /// links, mutual `prev`/`next` links, closed face rings whose members
    /// carry the right face and all have origin vertices. Intended for tests
    /// and debug assertions; ring walks are step-capped so a corrupt list
    /// yields an error rather than a hang.
    pub fn validate(&self) -> Result<(), DcelError> {
        for (id, he) in &self.half_edges {
            let twin = he.twin.ok_or(DcelError::MissingTwin)?;
            if twin == id || self.half_edges[twin].twin != Some(id) {
                return Err(DcelError::TwinAsymmetry);
            }
            if he.face.is_some() && he.face == self.half_edges[twin].face {
                return Err(DcelError::TwinFaceShared);
            }
            if let Some(n) = he.next {
                if self.half_edges[n].prev != Some(id) {
                    return Err(DcelError::LinkAsymmetry);
                }
            }
            if let Some(p) = he.prev {
                if self.half_edges[p].next != Some(id) {
                    return Err(DcelError::LinkAsymmetry);
                }
            }
        }

        for &face in &self.face_order {
            let head = self.faces[face].head.ok_or(DcelError::OpenFace)?;
            let tail = self.faces[face].tail.ok_or(DcelError::OpenFace)?;
            let mut cur = head;
            let mut steps = 0;
            loop {
                let he = &self.half_edges[cur];
                if he.face != Some(face) {
                    return Err(DcelError::ForeignHalfEdge);
                }
                if he.origin.is_none() {
                    return Err(DcelError::MissingOrigin);
                }
                cur = he.next.ok_or(DcelError::RingNotClosed)?;
                steps += 1;
                if cur == head {
                    break;
                }
                if steps > self.half_edges.len() {
                    return Err(DcelError::RingNotClosed);
                }
            }
            if self.half_edges[tail].next != Some(head) {
                return Err(DcelError::RingNotClosed);
            }
        }
        Ok(())
    }
}

/// Iterator over the half-edges of one face ring.
pub struct RingIter<'a> {
    el: &'a EdgeList,
    start: Option<HalfEdgeId>,
    current: Option<HalfEdgeId>,
    started: bool,
    remaining: usize,
}

impl<'a> Iterator for RingIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let current = self.current?;
        if self.started && Some(current) == self.start {
            return None;
        }
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.started = true;
        self.current = self.el.half_edges[current].next;
        Some(current)
    }
}

impl fmt::Display for EdgeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn endpoint(el: &EdgeList, v: Option<VertexId>) -> String {
            match v {
                Some(v) => format!("({:.2}, {:.2})", el.point(v).x, el.point(v).y),
                None => "NONE".to_string(),
            }
        }
        for &face in &self.face_order {
            writeln!(f, "face:")?;
            let site = self.faces[face].site;
            writeln!(f, "\tsite ({:.2}, {:.2})", site.x, site.y)?;
            for he in self.ring(face) {
                writeln!(
                    f,
                    "\thalf edge {} -> {}",
                    endpoint(self, self.half_edges[he].origin),
                    endpoint(self, self.destination(he)),
                )?;
            }
        }
        Ok(())
    }
}

/// Dump every face and half-edge of `el` to stdout in a human-readable form.
pub fn print_edge_list(el: &EdgeList) {
    print!("{el}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_of(el: &EdgeList, face: FaceId) -> Vec<HalfEdgeId> {
        el.ring(face).collect()
    }

    #[test]
    fn new_edge_links_twins() {
        let mut el = EdgeList::new();
        let he = el.new_edge();
        let tw = el.twin(he).unwrap();
        assert_ne!(he, tw);
        assert_eq!(el.twin(tw), Some(he));
        assert_eq!(el.num_half_edges(), 2);
    }

    #[test]
    fn faces_keep_insertion_order() {
        let mut el = EdgeList::new();
        let a = el.new_face(Point2::new(1.0, 1.0));
        let b = el.new_face(Point2::new(2.0, 2.0));
        let c = el.new_face(Point2::new(3.0, 3.0));
        assert_eq!(el.faces_in_order(), &[a, b, c]);
    }

    #[test]
    fn set_head_and_tail_grow_the_chain() {
        let mut el = EdgeList::new();
        let f = el.new_face(Point2::new(0.0, 0.0));
        let mid = el.new_half_edge();
        el.set_head(f, mid);
        assert_eq!(el.faces[f].head, Some(mid));
        assert_eq!(el.faces[f].tail, Some(mid));

        let front = el.new_half_edge();
        el.set_head(f, front);
        let back = el.new_half_edge();
        el.set_tail(f, back);
        assert_eq!(chain_of(&el, f), vec![front, mid, back]);
        assert_eq!(el.faces[f].tail, Some(back));
    }

    #[test]
    fn insert_after_and_before_maintain_brackets() {
        let mut el = EdgeList::new();
        let f = el.new_face(Point2::new(0.0, 0.0));
        let a = el.new_half_edge();
        el.set_head(f, a);
        let b = el.new_half_edge();
        el.insert_after(a, b).unwrap();
        assert_eq!(el.faces[f].tail, Some(b));

        let c = el.new_half_edge();
        el.insert_before(a, c).unwrap();
        assert_eq!(el.faces[f].head, Some(c));
        assert_eq!(chain_of(&el, f), vec![c, a, b]);

        let d = el.new_half_edge();
        el.insert_after(a, d).unwrap();
        assert_eq!(chain_of(&el, f), vec![c, a, d, b]);
        // A splice in the middle leaves the brackets alone.
        assert_eq!(el.faces[f].head, Some(c));
        assert_eq!(el.faces[f].tail, Some(b));
    }

    #[test]
    fn connect_merges_fragments_and_tracks_the_tail() {
        let mut el = EdgeList::new();
        let f = el.new_face(Point2::new(0.0, 0.0));
        let a = el.new_half_edge();
        el.set_head(f, a);

        // A floating two-edge fragment of the same face.
        let b = el.new_half_edge();
        let c = el.new_half_edge();
        el.half_edges[b].face = Some(f);
        el.half_edges[c].face = Some(f);
        el.half_edges[b].next = Some(c);
        el.half_edges[c].prev = Some(b);

        el.connect(a, b).unwrap();
        // The tail bracket follows the fragment to its far end.
        assert_eq!(el.faces[f].tail, Some(c));
        assert_eq!(chain_of(&el, f), vec![a, b, c]);
    }

    #[test]
    fn connect_closing_the_ring_keeps_brackets() {
        let mut el = EdgeList::new();
        let f = el.new_face(Point2::new(0.0, 0.0));
        let a = el.new_half_edge();
        el.set_head(f, a);
        let b = el.new_half_edge();
        el.insert_after(a, b).unwrap();

        el.connect(b, a).unwrap();
        assert_eq!(el.faces[f].head, Some(a));
        assert_eq!(el.faces[f].tail, Some(b));
        assert_eq!(chain_of(&el, f), vec![a, b]);
    }

    #[test]
    fn connect_rejects_relinking_and_face_mixups() {
        let mut el = EdgeList::new();
        let f = el.new_face(Point2::new(0.0, 0.0));
        let g = el.new_face(Point2::new(9.0, 9.0));
        let a = el.new_half_edge();
        let b = el.new_half_edge();
        el.set_head(f, a);
        el.set_head(g, b);
        assert_eq!(el.connect(a, b), Err(DcelError::FaceMismatch));

        let c = el.new_half_edge();
        el.half_edges[c].face = Some(f);
        el.connect(a, c).unwrap();
        let d = el.new_half_edge();
        el.half_edges[d].face = Some(f);
        assert_eq!(el.connect(a, d), Err(DcelError::AlreadyConnected));
    }

    #[test]
    fn display_marks_open_endpoints() {
        let mut el = EdgeList::new();
        let f = el.new_face(Point2::new(10.0, 20.0));
        let he = el.new_edge();
        let v = el.new_vertex(Point2::new(1.0, 2.0));
        el.half_edges[he].origin = Some(v);
        el.set_head(f, he);
        let text = format!("{el}");
        assert!(text.contains("site (10.00, 20.00)"));
        assert!(text.contains("half edge (1.00, 2.00) -> NONE"));
    }
}
