//! Shared vertex graph for contour assembly
//!
//! Vertices live in an arena and are addressed by [`VertexId`]. Each vertex
//! keeps forward/backward links to its neighbours and the list of edge slots
//! that currently hold it, so replacing or detaching a vertex is an index
//! update on the slot table rather than pointer surgery.
//!
//! The graph provides the polyline capability the contour assembler relies
//! on:
//! - [`VertexGraph::backtrace`] walks a chain back to its start
//! - [`VertexGraph::chain`] collects a chain forward from its start
//! - [`VertexGraph::decimate`] removes points that add less than a given area
//! - [`VertexGraph::detach`] clears a chain out of the slot table

use crate::error::CoreResult;
use crate::path::{Path, Point3};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use tracing::trace;

/// Index of a vertex in a [`VertexGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(usize);

impl VertexId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index into the slot table of a [`VertexGraph`]
pub type SlotId = usize;

/// A point in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: Option<f32>,
    next: Option<VertexId>,
    prev: Option<VertexId>,
    refs: Vec<SlotId>,
}

impl Vertex {
    fn new(x: f32, y: f32, z: Option<f32>) -> Self {
        Self {
            x,
            y,
            z,
            next: None,
            prev: None,
            refs: Vec::new(),
        }
    }

    pub fn next(&self) -> Option<VertexId> {
        self.next
    }

    pub fn prev(&self) -> Option<VertexId> {
        self.prev
    }

    /// Slots currently pointing at this vertex
    pub fn refs(&self) -> &[SlotId] {
        &self.refs
    }

    fn point(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z.unwrap_or(0.0))
    }
}

/// An ordered run of vertices collected from the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub ids: Vec<VertexId>,
    pub closed: bool,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Arena of linked vertices plus the slot table that references them
#[derive(Debug, Clone, Default)]
pub struct VertexGraph {
    vertices: Vec<Vertex>,
    slots: Vec<Option<VertexId>>,
}

impl VertexGraph {
    /// Empty graph with `slot_count` empty slots
    pub fn with_slots(slot_count: usize) -> Self {
        Self {
            vertices: Vec::new(),
            slots: vec![None; slot_count],
        }
    }

    /// Like [`VertexGraph::with_slots`], but reports a slot table that cannot
    /// be allocated instead of aborting
    pub fn try_with_slots(slot_count: usize) -> CoreResult<Self> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(slot_count)?;
        slots.resize(slot_count, None);
        Ok(Self {
            vertices: Vec::new(),
            slots,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Vertex held by `slot`
    pub fn slot(&self, slot: SlotId) -> Option<VertexId> {
        self.slots[slot]
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0]
    }

    pub fn next(&self, id: VertexId) -> Option<VertexId> {
        self.vertices[id.0].next
    }

    pub fn prev(&self, id: VertexId) -> Option<VertexId> {
        self.vertices[id.0].prev
    }

    /// Add a vertex that no slot references
    pub fn push(&mut self, x: f32, y: f32, z: Option<f32>) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(Vertex::new(x, y, z));
        id
    }

    /// Add a vertex and store it in `slot`, recording the back-reference
    pub fn insert_at(&mut self, slot: SlotId, x: f32, y: f32) -> VertexId {
        let id = self.push(x, y, None);
        self.slots[slot] = Some(id);
        self.vertices[id.0].refs.push(slot);
        id
    }

    /// Make `b` follow `a`
    pub fn link(&mut self, a: VertexId, b: VertexId) {
        self.vertices[a.0].next = Some(b);
        self.vertices[b.0].prev = Some(a);
    }

    /// Point every slot holding `old` at `new` instead
    pub fn replace(&mut self, old: VertexId, new: VertexId) {
        if old == new {
            return;
        }
        let refs = std::mem::take(&mut self.vertices[old.0].refs);
        for &slot in &refs {
            self.slots[slot] = Some(new);
        }
        self.vertices[new.0].refs.extend(refs);
    }

    /// Walk `prev` links from `from` to the start of its chain.
    ///
    /// Returns `from` itself when the walk closes back on it, or the first
    /// vertex without a predecessor. A walk that revisits a vertex other than
    /// `from` stops at the last new vertex.
    pub fn backtrace(&self, from: VertexId) -> VertexId {
        let mut visited = HashSet::new();
        visited.insert(from);
        let mut current = from;
        while let Some(p) = self.prev(current) {
            if p == from || !visited.insert(p) {
                break;
            }
            current = p;
        }
        if self.prev(current) == Some(from) && current != from {
            // the loop closed: the chain may start anywhere, keep `from`
            return from;
        }
        current
    }

    /// Collect the chain starting at `start` by following `next` links.
    pub fn chain(&self, start: VertexId) -> Chain {
        let mut ids = vec![start];
        let mut seen = HashSet::new();
        seen.insert(start);
        let mut closed = false;
        let mut current = start;
        while let Some(n) = self.next(current) {
            if n == start {
                closed = true;
                break;
            }
            if !seen.insert(n) {
                break;
            }
            ids.push(n);
            current = n;
        }
        Chain { ids, closed }
    }

    /// Remove points whose triangle with their neighbours has an area below
    /// `tolerance`, smallest first.
    ///
    /// Endpoints of open chains are kept and closed chains keep at least three
    /// points. Removed vertices hand their slots to the neighbour that precedes
    /// them, and survivors are relinked in order.
    pub fn decimate(&mut self, chain: &Chain, tolerance: f32) -> Chain {
        let n = chain.ids.len();
        let min_points = if chain.closed { 3 } else { 2 };
        if n <= min_points {
            return chain.clone();
        }

        let pts: Vec<(f32, f32)> = chain
            .ids
            .iter()
            .map(|id| (self.vertices[id.0].x, self.vertices[id.0].y))
            .collect();
        let mut prev: Vec<usize> = (0..n).map(|i| (i + n - 1) % n).collect();
        let mut next: Vec<usize> = (0..n).map(|i| (i + 1) % n).collect();
        let mut alive = vec![true; n];
        let mut version = vec![0u32; n];
        let mut remaining = n;

        let candidate = |i: usize| chain.closed || (i != 0 && i != n - 1);
        let area = |prev: &[usize], next: &[usize], i: usize| {
            let (ax, ay) = pts[prev[i]];
            let (bx, by) = pts[i];
            let (cx, cy) = pts[next[i]];
            ((ax - bx) * (cy - by) - (ay - by) * (cx - bx)).abs() / 2.0
        };

        let mut heap = BinaryHeap::new();
        for i in (0..n).filter(|&i| candidate(i)) {
            heap.push(Candidate {
                area: area(&prev, &next, i),
                index: i,
                version: 0,
            });
        }

        while let Some(c) = heap.pop() {
            if remaining <= min_points || c.area >= tolerance {
                break;
            }
            if !alive[c.index] || version[c.index] != c.version {
                continue;
            }

            let (p, q) = (prev[c.index], next[c.index]);
            alive[c.index] = false;
            remaining -= 1;
            next[p] = q;
            prev[q] = p;
            self.replace(chain.ids[c.index], chain.ids[p]);

            for k in [p, q] {
                if alive[k] && candidate(k) {
                    version[k] += 1;
                    heap.push(Candidate {
                        area: area(&prev, &next, k),
                        index: k,
                        version: version[k],
                    });
                }
            }
        }

        let ids: Vec<VertexId> = chain
            .ids
            .iter()
            .zip(&alive)
            .filter(|&(_, &keep)| keep)
            .map(|(&id, _)| id)
            .collect();
        for pair in ids.windows(2) {
            self.link(pair[0], pair[1]);
        }
        if let (Some(&first), Some(&last)) = (ids.first(), ids.last()) {
            if chain.closed {
                self.link(last, first);
            } else {
                self.vertices[first.0].prev = None;
                self.vertices[last.0].next = None;
            }
        }

        trace!("Decimated chain from {} to {} vertices", n, ids.len());
        Chain {
            ids,
            closed: chain.closed,
        }
    }

    /// Clear every slot that references a vertex of `chain`.
    pub fn detach(&mut self, chain: &Chain) {
        for &id in &chain.ids {
            let refs = std::mem::take(&mut self.vertices[id.0].refs);
            for slot in refs {
                if self.slots[slot] == Some(id) {
                    self.slots[slot] = None;
                }
            }
        }
    }

    /// Copy a chain's positions into an owned [`Path`]
    pub fn to_path(&self, chain: &Chain) -> Path {
        Path::new(
            chain
                .ids
                .iter()
                .map(|id| self.vertices[id.0].point())
                .collect(),
            chain.closed,
        )
    }
}

/// Heap entry ordered so the smallest area pops first
#[derive(Debug, Clone, Copy)]
struct Candidate {
    area: f32,
    index: usize,
    version: u32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .area
            .total_cmp(&self.area)
            .then_with(|| other.index.cmp(&self.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_line(graph: &mut VertexGraph, pts: &[(f32, f32)]) -> Vec<VertexId> {
        let ids: Vec<_> = pts
            .iter()
            .enumerate()
            .map(|(slot, &(x, y))| graph.insert_at(slot, x, y))
            .collect();
        for pair in ids.windows(2) {
            graph.link(pair[0], pair[1]);
        }
        ids
    }

    #[test]
    fn test_try_with_slots() {
        let graph = VertexGraph::try_with_slots(6).unwrap();
        assert_eq!(graph.slot_count(), 6);
        assert!((0..6).all(|s| graph.slot(s).is_none()));

        assert!(matches!(
            VertexGraph::try_with_slots(usize::MAX),
            Err(crate::CoreError::Allocation(_))
        ));
    }

    #[test]
    fn test_backtrace_open_chain() {
        let mut graph = VertexGraph::with_slots(4);
        let ids = open_line(&mut graph, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert_eq!(graph.backtrace(ids[2]), ids[0]);
        assert_eq!(graph.backtrace(ids[0]), ids[0]);

        let chain = graph.chain(ids[0]);
        assert_eq!(chain.ids, ids);
        assert!(!chain.closed);
    }

    #[test]
    fn test_backtrace_closed_loop() {
        let mut graph = VertexGraph::with_slots(4);
        let ids = open_line(&mut graph, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        graph.link(ids[2], ids[0]);

        assert_eq!(graph.backtrace(ids[1]), ids[1]);
        let chain = graph.chain(ids[1]);
        assert!(chain.closed);
        assert_eq!(chain.ids, vec![ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn test_backtrace_stops_on_foreign_cycle() {
        // a -> b -> c -> b: walking back from a never returns to a
        let mut graph = VertexGraph::with_slots(0);
        let a = graph.push(0.0, 0.0, None);
        let b = graph.push(1.0, 0.0, None);
        let c = graph.push(2.0, 0.0, None);
        graph.link(b, a);
        graph.link(c, b);
        graph.link(b, c);
        let start = graph.backtrace(a);
        assert!(start == b || start == c);
    }

    #[test]
    fn test_replace_moves_slots() {
        let mut graph = VertexGraph::with_slots(3);
        let a = graph.insert_at(0, 0.0, 0.0);
        let b = graph.insert_at(1, 1.0, 0.0);
        graph.replace(a, b);
        assert_eq!(graph.slot(0), Some(b));
        assert_eq!(graph.vertex(b).refs(), &[1, 0]);
        assert!(graph.vertex(a).refs().is_empty());
    }

    #[test]
    fn test_decimate_collinear_points() {
        let mut graph = VertexGraph::with_slots(5);
        let ids = open_line(
            &mut graph,
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)],
        );
        let chain = graph.chain(ids[0]);
        let simplified = graph.decimate(&chain, 0.01);
        assert_eq!(simplified.ids, vec![ids[0], ids[4]]);
        assert_eq!(graph.next(ids[0]), Some(ids[4]));
        // every slot now resolves to a survivor
        for slot in 0..4 {
            assert_eq!(graph.slot(slot), Some(ids[0]));
        }
        assert_eq!(graph.slot(4), Some(ids[4]));
    }

    #[test]
    fn test_decimate_keeps_corners() {
        let mut graph = VertexGraph::with_slots(5);
        let ids = open_line(
            &mut graph,
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (2.0, 2.0)],
        );
        let chain = graph.chain(ids[0]);
        let simplified = graph.decimate(&chain, 0.01);
        assert_eq!(simplified.ids, vec![ids[0], ids[2], ids[4]]);
    }

    #[test]
    fn test_decimate_closed_keeps_triangle() {
        let mut graph = VertexGraph::with_slots(4);
        let ids = open_line(&mut graph, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        graph.link(ids[3], ids[0]);
        let chain = graph.chain(ids[0]);
        let simplified = graph.decimate(&chain, 100.0);
        assert_eq!(simplified.len(), 3);
        assert!(simplified.closed);
    }

    #[test]
    fn test_detach_clears_slots() {
        let mut graph = VertexGraph::with_slots(3);
        let ids = open_line(&mut graph, &[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let chain = graph.chain(ids[0]);
        graph.detach(&chain);
        assert!((0..3).all(|s| graph.slot(s).is_none()));

        let path = graph.to_path(&chain);
        assert_eq!(path.len(), 3);
        assert!(!path.closed);
        assert_eq!(path.points[1], Point3::xy(1.0, 1.0));
    }
}
