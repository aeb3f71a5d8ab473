//! The Fortune sweep driver.
//!
//! Consumes site and arc-removal events in ascending sweep order, mutates
//! the beachline, and writes the growing diagram into the caller's
//! [`EdgeList`]. After the last event two finalization passes run: every
//! surviving breakpoint projects its open half-edge onto the bounding box,
//! and every face ring is closed along the box.
//!
//! All sweep state lives on one [`Sweep`] value created and consumed per
//! construction; the beachline and event arenas are released in bulk when
//! it drops, while the edge list belongs to the caller.

use crate::beachline::{ArcNode, Beachline, BreakpointNode, NodeId, NodeKind};
use crate::event::{Event, EventId, EventQueue};
use crate::VoronoiError;
use log::{debug, trace};
use mapgen_dcel::{EdgeList, FaceId};
use mapgen_math::{circumcircle, orient2d, Bounds, Parabola, Point2, Vector2};
use ordered_float::OrderedFloat;
use std::collections::HashSet;

fn corrupt(what: &'static str) -> VoronoiError {
    VoronoiError::CorruptBeachline(what)
}

pub(crate) struct Sweep<'a> {
    el: &'a mut EdgeList,
    beachline: Beachline,
    queue: EventQueue,
    bounds: Bounds,
    tolerance: f64,
}

impl<'a> Sweep<'a> {
    pub fn new(el: &'a mut EdgeList, bounds: Bounds, tolerance: f64) -> Self {
        Self {
            el,
            beachline: Beachline::new(),
            queue: EventQueue::new(),
            bounds,
            tolerance,
        }
    }

    /// Validate the sites, create their faces in caller order, and schedule
    /// one site event each.
    pub fn seed(&mut self, sites: &[Point2]) -> Result<(), VoronoiError> {
        if sites.is_empty() {
            return Err(VoronoiError::NoSites);
        }
        let mut seen = HashSet::with_capacity(sites.len());
        for &site in sites {
            if !self.bounds.contains_strict(site, self.tolerance) {
                return Err(VoronoiError::SiteOutOfBounds { x: site.x, y: site.y });
            }
            if !seen.insert((OrderedFloat(site.x), OrderedFloat(site.y))) {
                return Err(VoronoiError::DuplicateSite { x: site.x, y: site.y });
            }
            let face = self.el.new_face(site);
            self.queue.push(Event::AddArc { face, site }, site.y, site.x);
        }
        debug!("seeded {} sites", sites.len());
        Ok(())
    }

    /// Run the sweep to completion and finalize the diagram.
    pub fn run(&mut self) -> Result<(), VoronoiError> {
        while let Some((id, event, sweep_y)) = self.queue.pop() {
            match event {
                Event::AddArc { face, site } => {
                    trace!("site event at y = {sweep_y:.2}: ({:.2}, {:.2})", site.x, site.y);
                    self.handle_add_arc(face, site)?;
                }
                Event::RemoveArc { arc, center } => {
                    trace!("circle event at y = {sweep_y:.2}: center ({:.2}, {:.2})", center.x, center.y);
                    self.handle_remove_arc(id, arc, center, sweep_y)?;
                }
            }
        }
        debug!(
            "sweep done: {} vertices, {} half-edges before closure",
            self.el.num_vertices(),
            self.el.num_half_edges()
        );
        self.close_open_half_edges()?;
        self.close_open_faces()
    }

    // =========================================================================
    // Site events
    // =========================================================================

    fn handle_add_arc(&mut self, face: FaceId, site: Point2) -> Result<(), VoronoiError> {
        if self.beachline.is_empty() {
            let node = self.beachline.alloc(NodeKind::Arc(ArcNode {
                face,
                site,
                event: None,
            }));
            self.beachline.root = Some(node);
            return Ok(());
        }

        let split = self
            .beachline
            .locate_arc_above(site.x, site.y)
            .ok_or_else(|| corrupt("locate failed on a non-empty beachline"))?;
        let (split_face, split_site) = {
            let arc = self.beachline.arc(split).ok_or_else(|| corrupt("located node is not an arc"))?;
            (arc.face, arc.site)
        };

        if split_site.y == site.y {
            self.split_arc_level(split, split_face, split_site, face, site)
        } else {
            self.split_arc(split, split_face, split_site, face, site)
        }
    }

    /// Replace the located arc by the five-node fragment
    /// `split, bp, new, bp, clone`.
    fn split_arc(
        &mut self,
        split: NodeId,
        split_face: FaceId,
        split_site: Point2,
        face: FaceId,
        site: Point2,
    ) -> Result<(), VoronoiError> {
        let ly = site.y;
        let x = site.x;
        let y = Parabola::from_focus_directrix(split_site, ly).eval(x);

        // Both breakpoints start on the split arc directly above the new
        // site and move along the bisector of the two sites, in opposite
        // directions; the right-hand one keeps dx >= 0.
        let m = site - split_site;
        let (dx, dy) = if m.x == 0.0 {
            (1.0, 0.0)
        } else {
            (1.0, -m.x / m.y)
        };

        let left_he = self.el.new_edge();
        let right_he = self.el.twin(left_he).ok_or(mapgen_dcel::DcelError::MissingTwin)?;
        if self.el.faces[split_face].head.is_none() {
            self.el.set_tail(split_face, left_he);
        } else {
            // The split cell already has boundary pieces elsewhere; this
            // half-edge stays a floating fragment until a circle event or
            // the closing walk picks it up.
            self.el.half_edges[left_he].face = Some(split_face);
        }
        self.el.set_tail(face, right_he);

        let parent = self.beachline.node(split).parent;
        let clone = self.beachline.alloc(NodeKind::Arc(ArcNode {
            face: split_face,
            site: split_site,
            event: None,
        }));
        let new_arc = self.beachline.alloc(NodeKind::Arc(ArcNode {
            face,
            site,
            event: None,
        }));
        let le = self.beachline.alloc(NodeKind::Breakpoint(BreakpointNode {
            x,
            y,
            dx: -dx,
            dy: -dy,
            half_edge: left_he,
        }));
        let re = self.beachline.alloc(NodeKind::Breakpoint(BreakpointNode {
            x,
            y,
            dx,
            dy,
            half_edge: right_he,
        }));

        self.beachline.replace_child(parent, split, le);
        let nodes = &mut self.beachline.nodes;
        nodes[le].left = Some(split);
        nodes[split].parent = Some(le);
        nodes[le].right = Some(re);
        nodes[re].parent = Some(le);
        nodes[re].left = Some(new_arc);
        nodes[new_arc].parent = Some(re);
        nodes[re].right = Some(clone);
        nodes[clone].parent = Some(re);

        self.schedule_remove_event(split, ly)?;
        self.schedule_remove_event(clone, ly)
    }

    /// Split against an arc whose site sits at the same height as the new
    /// one. This only happens among the topmost row of sites, while no
    /// lower site has contributed an arc yet; the located arc is the new
    /// site's left-hand neighbor in that row.
    ///
    /// The bisector is the vertical midline and only its lower half is
    /// traced by a breakpoint; the upper half is already determined and is
    /// pinned to the box top edge here.
    fn split_arc_level(
        &mut self,
        split: NodeId,
        split_face: FaceId,
        split_site: Point2,
        face: FaceId,
        site: Point2,
    ) -> Result<(), VoronoiError> {
        let mid = (split_site.x + site.x) / 2.0;

        let left_he = self.el.new_edge();
        let right_he = self.el.twin(left_he).ok_or(mapgen_dcel::DcelError::MissingTwin)?;
        let top = self.el.new_vertex(Point2::new(mid, 0.0));
        self.el.half_edges[left_he].origin = Some(top);
        if self.el.faces[split_face].head.is_none() {
            self.el.set_tail(split_face, left_he);
        } else {
            self.el.half_edges[left_he].face = Some(split_face);
        }
        self.el.set_tail(face, right_he);

        let parent = self.beachline.node(split).parent;
        let new_arc = self.beachline.alloc(NodeKind::Arc(ArcNode {
            face,
            site,
            event: None,
        }));
        let bp = self.beachline.alloc(NodeKind::Breakpoint(BreakpointNode {
            x: mid,
            y: 0.0,
            dx: 0.0,
            dy: 1.0,
            half_edge: left_he,
        }));

        self.beachline.replace_child(parent, split, bp);
        let nodes = &mut self.beachline.nodes;
        nodes[bp].left = Some(split);
        nodes[split].parent = Some(bp);
        nodes[bp].right = Some(new_arc);
        nodes[new_arc].parent = Some(bp);

        self.schedule_remove_event(split, site.y)?;
        self.schedule_remove_event(new_arc, site.y)
    }

    // =========================================================================
    // Circle events
    // =========================================================================

    fn handle_remove_arc(
        &mut self,
        fired: EventId,
        arc: NodeId,
        center: Point2,
        sweep_y: f64,
    ) -> Result<(), VoronoiError> {
        // The arc may have been spliced out or re-scheduled since this event
        // was created; a live event is still referenced by its arc.
        let m_site = match self.beachline.arc(arc) {
            Some(a) if a.event == Some(fired) => a.site,
            _ => {
                trace!("dropping stale circle event");
                return Ok(());
            }
        };

        let le = self.beachline.prev(arc).ok_or_else(|| corrupt("vanishing arc has no left breakpoint"))?;
        let re = self.beachline.next(arc).ok_or_else(|| corrupt("vanishing arc has no right breakpoint"))?;
        let la = self.beachline.prev(le).ok_or_else(|| corrupt("no arc left of the vanishing triple"))?;
        let ra = self.beachline.next(re).ok_or_else(|| corrupt("no arc right of the vanishing triple"))?;
        let (la_face, la_site) = {
            let a = self.beachline.arc(la).ok_or_else(|| corrupt("left neighbor is not an arc"))?;
            (a.face, a.site)
        };
        let (ra_face, ra_site) = {
            let a = self.beachline.arc(ra).ok_or_else(|| corrupt("right neighbor is not an arc"))?;
            (a.face, a.site)
        };
        let left_he = self
            .beachline
            .breakpoint(le)
            .ok_or_else(|| corrupt("left neighbor of an arc is not a breakpoint"))?
            .half_edge;
        let right_he = self
            .beachline
            .breakpoint(re)
            .ok_or_else(|| corrupt("right neighbor of an arc is not a breakpoint"))?
            .half_edge;

        // One enclosing breakpoint is the arc's parent; the other is a
        // proper ancestor and survives as the breakpoint between the outer
        // arcs.
        let parent = self.beachline.node(arc).parent.ok_or_else(|| corrupt("vanishing arc has no parent"))?;
        if parent != le && parent != re {
            return Err(corrupt("vanishing arc is not a child of its breakpoints"));
        }
        let survivor = if parent == le { re } else { le };
        let sibling = {
            let p = self.beachline.node(parent);
            if p.left == Some(arc) { p.right } else { p.left }
        }
        .ok_or_else(|| corrupt("vanishing arc's parent has a single child"))?;
        let grandparent = self
            .beachline
            .node(parent)
            .parent
            .ok_or_else(|| corrupt("spliced breakpoint has no ancestor"))?;

        self.beachline.replace_child(Some(grandparent), parent, sibling);
        self.beachline.remove(arc);
        self.beachline.remove(parent);

        // New direction: orthogonal to the line through the outer sites,
        // pointing down and away from the vanished circle.
        let d = la_site - ra_site;
        let (dx, dy) = if d.x == 0.0 {
            (if m_site.x > center.x { -1.0 } else { 1.0 }, 0.0)
        } else if d.y == 0.0 {
            (0.0, 1.0)
        } else {
            let (ex, ey) = (1.0, -d.x / d.y);
            if ey < 0.0 {
                (-ex, -ey)
            } else {
                (ex, ey)
            }
        };

        // The meeting point becomes a vertex: both incoming half-edges end
        // there, the vanished cell's ring is spliced shut across it, and a
        // fresh pair starts between the outer cells.
        let vertex = self.el.new_vertex(center);
        let left_twin = self.el.twin(left_he).ok_or(mapgen_dcel::DcelError::MissingTwin)?;
        let right_twin = self.el.twin(right_he).ok_or(mapgen_dcel::DcelError::MissingTwin)?;
        if self.el.half_edges[left_twin].origin.is_some() || self.el.half_edges[right_twin].origin.is_some() {
            return Err(mapgen_dcel::DcelError::EndpointAssigned.into());
        }
        self.el.half_edges[left_twin].origin = Some(vertex);
        self.el.half_edges[right_twin].origin = Some(vertex);
        self.el.connect(right_he, left_twin)?;

        let down = self.el.new_edge();
        let up = self.el.twin(down).ok_or(mapgen_dcel::DcelError::MissingTwin)?;
        self.el.half_edges[down].face = Some(la_face);
        self.el.half_edges[down].origin = Some(vertex);
        self.el.half_edges[up].face = Some(ra_face);
        self.el.connect(left_he, down)?;
        self.el.connect(up, right_twin)?;

        let bp = self
            .beachline
            .breakpoint_mut(survivor)
            .ok_or_else(|| corrupt("surviving node is not a breakpoint"))?;
        bp.x = center.x;
        bp.y = center.y;
        bp.dx = dx;
        bp.dy = dy;
        bp.half_edge = down;

        self.schedule_remove_event(la, sweep_y)?;
        self.schedule_remove_event(ra, sweep_y)
    }

    /// Drop any pending removal of `arc`, then re-check whether its
    /// enclosing breakpoints converge and schedule a fresh event if so.
    ///
    /// Three adjacent arc sites taken left to right converge exactly when
    /// they turn clockwise on screen; the breakpoints then meet at the
    /// circumcenter of the triple, and the event fires once the sweep
    /// reaches the bottom of the circumscribed circle.
    fn schedule_remove_event(&mut self, arc: NodeId, sweep_y: f64) -> Result<(), VoronoiError> {
        let pending = self
            .beachline
            .arc_mut(arc)
            .ok_or_else(|| corrupt("re-check target is not an arc"))?
            .event
            .take();
        if let Some(old) = pending {
            self.queue.remove(old);
        }

        let (le, re) = match (self.beachline.prev(arc), self.beachline.next(arc)) {
            (Some(le), Some(re)) => (le, re),
            _ => return Ok(()),
        };
        let (la, ra) = match (self.beachline.prev(le), self.beachline.next(re)) {
            (Some(la), Some(ra)) => (la, ra),
            _ => return Ok(()),
        };

        let l = self.beachline.arc(la).ok_or_else(|| corrupt("left outer node is not an arc"))?.site;
        let m = self.beachline.arc(arc).ok_or_else(|| corrupt("re-check target is not an arc"))?.site;
        let r = self.beachline.arc(ra).ok_or_else(|| corrupt("right outer node is not an arc"))?.site;

        if !orient2d(l, m, r).is_positive() {
            return Ok(());
        }
        let Some((center, radius)) = circumcircle(l, m, r) else {
            return Ok(());
        };
        // A meeting point outside the box never becomes a diagram vertex;
        // the enclosing breakpoints are clipped at the boundary instead.
        if !self.bounds.contains(center, self.tolerance) {
            return Ok(());
        }
        let priority = center.y + radius;
        if priority < sweep_y {
            return Ok(());
        }

        trace!(
            "arc of site ({:.2}, {:.2}) will vanish at ({:.2}, {:.2}), sweep {:.2}",
            m.x,
            m.y,
            center.x,
            center.y,
            priority
        );
        let id = self.queue.push(Event::RemoveArc { arc, center }, priority, center.x);
        self.beachline
            .arc_mut(arc)
            .ok_or_else(|| corrupt("re-check target is not an arc"))?
            .event = Some(id);
        Ok(())
    }

    // =========================================================================
    // Finalization
    // =========================================================================

    /// Every breakpoint still on the beachline traces a half-edge with one
    /// open end; pin each of them to the bounding box.
    fn close_open_half_edges(&mut self) -> Result<(), VoronoiError> {
        let breakpoints: Vec<NodeId> = self
            .beachline
            .iter()
            .filter(|&id| self.beachline.breakpoint(id).is_some())
            .collect();
        for id in breakpoints {
            let bp = *self
                .beachline
                .breakpoint(id)
                .ok_or_else(|| corrupt("breakpoint vanished during closure"))?;
            trace!(
                "projecting breakpoint ({:.2}, {:.2}) + k({:.2}, {:.2})",
                bp.x,
                bp.y,
                bp.dx,
                bp.dy
            );
            self.el.project_half_edge_onto_bounds(
                bp.half_edge,
                Point2::new(bp.x, bp.y),
                Vector2::new(bp.dx, bp.dy),
                self.bounds,
                self.tolerance,
            )?;
        }
        Ok(())
    }

    /// Close every face ring along the box, in face insertion order.
    fn close_open_faces(&mut self) -> Result<(), VoronoiError> {
        for face in self.el.faces_in_order().to_vec() {
            self.el.close_face_with_bounds(face, self.bounds)?;
        }
        Ok(())
    }
}
