//! # Barnes–Hut Quadtree (2D)
//!
//! This module implements a **2D Barnes–Hut quadtree** for approximating the
//! mutual attraction of every body in a [`System`](crate::System). It replaces
//! the `O(N²)` all-pairs sum with an amortized `O(N log N)` traversal that is
//! exact for near neighbours and approximate for distant groups.
//!
//! ## Core Concepts
//!
//! - The root rectangle covers every body (see [`Rect::enclosing`]).
//! - A leaf stores the bodies that fall inside it, normally at most one.
//! - When a second body lands in a leaf, the leaf splits into four equal
//!   quadrants (NW, NE, SW, SE) and hands its bodies down.
//! - Splitting stops at `max_depth`; a leaf at that depth keeps every body
//!   that reaches it, so coincident points never recurse forever.
//! - After all inserts, one bottom-up pass stores total mass and center of
//!   mass (COM) on every node.
//! - A force query walks down from the root and treats a node as a single
//!   point mass once `size / distance < theta`.
//!
//! ## Storage
//!
//! Nodes live in one `Vec` and refer to their children by index. Bodies live
//! in a second `Vec` and are chained per leaf through `next` links, so moving
//! bodies to children on a split never allocates. [`Quadtree::reset`] clears
//! both vectors but keeps their capacity, which lets a caller rebuild the
//! tree every step without reallocating once the body count settles.
//!
//! The tree is a per-step value: it is created (or reset), filled,
//! aggregated and queried inside one step, then dropped or reset. Inserting
//! after [`Quadtree::compute_mass_distribution`] invalidates the aggregate.

use crate::simulation::bounds::{Quadrant, Rect};
use crate::simulation::states::{BodyId, NVec2};

/// Interactions at squared distance `<=` this contribute nothing
pub const SINGULARITY_GUARD: f64 = 1.0;

/// Index of the root node in [`Quadtree::nodes`]
pub const ROOT: usize = 0;

/// The copy of a body that the tree stores: identity, position and derived mass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeBody {
    pub id: BodyId,
    pub x: NVec2,
    pub m: f64,
}

/// A single quadtree node.
///
/// A node is either a leaf (`children == None`) holding zero or more bodies,
/// or an internal node with exactly four children and no bodies of its own.
#[derive(Debug, Clone)]
pub struct QuadNode {
    pub rect: Rect,
    pub depth: usize,
    pub children: Option<[usize; 4]>, // indices into Quadtree::nodes, in Quadrant order
    pub mass: f64,
    pub com: NVec2,
    head: Option<usize>, // first body entry of this leaf
    count: usize,
}

impl QuadNode {
    fn empty(rect: Rect, depth: usize) -> Self {
        Self {
            rect,
            depth,
            children: None,
            mass: 0.0,
            com: NVec2::zeros(),
            head: None,
            count: 0,
        }
    }

    pub fn is_subdivided(&self) -> bool {
        self.children.is_some()
    }

    /// Number of bodies stored directly in this node (always 0 once subdivided)
    pub fn body_count(&self) -> usize {
        self.count
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    body: TreeBody,
    next: Option<usize>,
}

/// Arena-backed Barnes–Hut quadtree.
#[derive(Debug, Clone)]
pub struct Quadtree {
    nodes: Vec<QuadNode>,
    entries: Vec<Entry>,
    max_depth: usize,
    deepest: usize,
    aggregated: bool,
}

impl Quadtree {
    /// Empty tree whose root covers `rect`.
    pub fn new(rect: Rect, max_depth: usize) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            entries: Vec::new(),
            max_depth,
            deepest: 0,
            aggregated: false,
        };
        tree.reset(rect, max_depth);
        tree
    }

    /// Build a ready-to-query tree in one call.
    ///
    /// This:
    /// 1. Creates a root node covering `rect`.
    /// 2. Inserts each body, subdividing leaves as needed.
    /// 3. Computes total mass and center-of-mass for every node (bottom-up).
    ///
    /// Bodies outside `rect` are skipped; use [`Quadtree::rebuild`] to learn
    /// how many.
    pub fn build<I>(rect: Rect, max_depth: usize, bodies: I) -> Self
    where
        I: IntoIterator<Item = TreeBody>,
    {
        let mut tree = Self::new(rect, max_depth);
        tree.rebuild(rect, max_depth, bodies);
        tree
    }

    /// Reset, insert every body and aggregate, reusing this tree's storage.
    ///
    /// # Returns
    /// The number of bodies rejected because they were outside `rect` or had
    /// a non-finite position.
    pub fn rebuild<I>(&mut self, rect: Rect, max_depth: usize, bodies: I) -> usize
    where
        I: IntoIterator<Item = TreeBody>,
    {
        self.reset(rect, max_depth);
        let mut rejected = 0;
        for body in bodies {
            if !self.insert(body) {
                tracing::warn!(id = body.id.0, x = body.x.x, y = body.x.y, "body outside quadtree root, skipped");
                rejected += 1;
            }
        }
        self.compute_mass_distribution();
        rejected
    }

    /// Drop every node and body but keep the allocations.
    pub fn reset(&mut self, rect: Rect, max_depth: usize) {
        self.nodes.clear();
        self.entries.clear();
        self.nodes.push(QuadNode::empty(rect, 0));
        self.max_depth = max_depth;
        self.deepest = 0;
        self.aggregated = false;
    }

    /// Insert a single body.
    ///
    /// The body walks down through subdivided nodes into the leaf whose
    /// half-open rectangle contains it and is appended there:
    ///
    /// - If the leaf was empty, it now holds this body.
    /// - If the leaf already held a body and sits above `max_depth`, it is
    ///   subdivided into four children and all its bodies are re-inserted
    ///   into whichever child contains them.
    /// - At `max_depth` the leaf simply keeps both.
    ///
    /// # Returns
    /// `false` (and nothing stored) when the position lies outside the root
    /// rectangle, which includes NaN and infinite coordinates.
    pub fn insert(&mut self, body: TreeBody) -> bool {
        if !self.nodes[ROOT].rect.contains(&body.x) {
            return false;
        }
        let entry_idx = self.entries.len();
        self.entries.push(Entry { body, next: None });
        self.insert_entry(ROOT, entry_idx);
        self.aggregated = false;
        true
    }

    /// Recursively compute total mass and center-of-mass for every node.
    ///
    /// - Leaf with bodies: sum of masses, mass-weighted mean position.
    /// - Empty leaf: mass 0, COM (0, 0). Zero mass keeps it out of every
    ///   force query, so the COM is never read.
    /// - Internal node: children first, then the mass sum and the
    ///   mass-weighted mean of the children's COMs.
    ///
    /// Must run after the last insert and before the first force query.
    pub fn compute_mass_distribution(&mut self) {
        self.aggregate(ROOT);
        self.aggregated = true;
    }

    /// Barnes–Hut acceleration on the body `target` located at `position`.
    ///
    /// For each visited node, starting at the root:
    ///
    /// 1. **Empty** (`mass == 0`): no contribution.
    /// 2. **Far** (`size / d < theta`, `d` the distance to the node's COM):
    ///    one point mass `mass / d²` pulling toward the COM.
    /// 3. **Near and subdivided**: visit the four children.
    /// 4. **Near leaf**: exact pairwise pull from every stored body except
    ///    the one whose id is `target`.
    ///
    /// Any single interaction with `d² <= 1` contributes zero. A node whose
    /// COM coincides with `position` gives `size / 0 = inf`, so it is always
    /// opened rather than approximated.
    ///
    /// `theta` near 0 approaches the exact all-pairs sum; larger values trade
    /// accuracy for speed.
    pub fn acceleration_on(&self, target: BodyId, position: NVec2, theta: f64) -> NVec2 {
        debug_assert!(self.aggregated, "force query before compute_mass_distribution");
        let mut acc = NVec2::zeros();
        self.traverse_node(ROOT, target, &position, theta, &mut acc);
        acc
    }

    pub fn root(&self) -> &QuadNode {
        &self.nodes[ROOT]
    }

    pub fn node(&self, idx: usize) -> &QuadNode {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[QuadNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Bodies inserted since the last reset
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Depth of the deepest node created so far
    pub fn depth(&self) -> usize {
        self.deepest
    }

    pub fn is_aggregated(&self) -> bool {
        self.aggregated
    }

    /// Bodies stored directly in node `idx`
    pub fn leaf_bodies(&self, idx: usize) -> LeafBodies<'_> {
        LeafBodies {
            entries: &self.entries,
            cursor: self.nodes[idx].head,
        }
    }

    /// Indices of every leaf node
    pub fn leaves(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_subdivided())
            .map(|(i, _)| i)
    }

    // helpers ==============================================================================

    fn insert_entry(&mut self, node_idx: usize, entry_idx: usize) {
        // Walk down to the leaf holding this position
        let pos = self.entries[entry_idx].body.x;
        let mut idx = node_idx;
        // Only the parent's midpoint routes. An east or south child's far edge
        // can round one ulp inside the parent's, and a body there still lands
        // in that child rather than being dropped.
        while let Some(children) = self.nodes[idx].children {
            let q = self.nodes[idx].rect.quadrant_of(&pos);
            idx = children[q.index()];
        }

        let node = &mut self.nodes[idx];
        self.entries[entry_idx].next = node.head;
        node.head = Some(entry_idx);
        node.count += 1;

        if node.count > 1 && node.depth < self.max_depth {
            self.subdivide(idx);
        }
    }

    /// Split leaf `node_idx` into four quadrants and move its bodies down.
    ///
    /// After this the node is internal: its body list is empty and every
    /// body it held sits in exactly one child (possibly split further).
    fn subdivide(&mut self, node_idx: usize) {
        let rect = self.nodes[node_idx].rect;
        let depth = self.nodes[node_idx].depth + 1;

        let first = self.nodes.len();
        for q in Quadrant::ALL {
            self.nodes.push(QuadNode::empty(rect.quadrant(q), depth));
        }
        let children = [first, first + 1, first + 2, first + 3];
        self.deepest = self.deepest.max(depth);

        let node = &mut self.nodes[node_idx];
        node.children = Some(children);
        node.count = 0;
        let mut cursor = node.head.take();

        while let Some(entry_idx) = cursor {
            cursor = self.entries[entry_idx].next.take();
            let q = rect.quadrant_of(&self.entries[entry_idx].body.x);
            self.insert_entry(children[q.index()], entry_idx);
        }
    }

    fn aggregate(&mut self, node_idx: usize) {
        let mut mass = 0.0;
        let mut weighted = NVec2::zeros();

        let children = self.nodes[node_idx].children;
        match children {
            None => {
                for b in self.leaf_bodies(node_idx) {
                    mass += b.m;
                    weighted += b.x * b.m;
                }
            }
            Some(children) => {
                for child in children {
                    // recurse first, then read the child's totals
                    self.aggregate(child);
                    let cn = &self.nodes[child];
                    mass += cn.mass;
                    weighted += cn.com * cn.mass;
                }
            }
        }

        let node = &mut self.nodes[node_idx];
        node.mass = mass;
        node.com = if mass > 0.0 { weighted / mass } else { NVec2::zeros() };
    }

    fn traverse_node(&self, node_idx: usize, target: BodyId, pos: &NVec2, theta: f64, acc: &mut NVec2) {
        let node = &self.nodes[node_idx];

        // Skip empty nodes
        if node.mass == 0.0 {
            return;
        }

        let r = node.com - pos;
        let dist = r.norm();

        if node.rect.size() / dist < theta {
            // Far enough away: the whole subtree acts as one mass at its COM
            *acc += point_mass_pull(r, node.mass);
        } else if let Some(children) = node.children {
            for child in children {
                self.traverse_node(child, target, pos, theta, acc);
            }
        } else {
            // Leaf too close to approximate: exact pairs, minus the target itself
            for b in self.leaf_bodies(node_idx) {
                if b.id == target {
                    continue;
                }
                *acc += point_mass_pull(b.x - pos, b.m);
            }
        }
    }
}

/// Iterator over the bodies chained to one leaf
pub struct LeafBodies<'a> {
    entries: &'a [Entry],
    cursor: Option<usize>,
}

impl<'a> Iterator for LeafBodies<'a> {
    type Item = &'a TreeBody;

    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries;
        let entry = &entries[self.cursor?];
        self.cursor = entry.next;
        Some(&entry.body)
    }
}

/// Acceleration toward a point mass `m` sitting at offset `r` from the target.
///
/// Magnitude `m / |r|²` along `r / |r|`, with no gravitational constant.
/// Returns zero when `|r|² <= SINGULARITY_GUARD`.
pub fn point_mass_pull(r: NVec2, m: f64) -> NVec2 {
    let d2 = r.norm_squared();
    if d2 <= SINGULARITY_GUARD {
        return NVec2::zeros();
    }
    let d = d2.sqrt();
    r * (m / (d2 * d))
}
