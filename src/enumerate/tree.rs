// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Backtracking tree traversal over type vectors.
//!
//! The search assigns one discrete *type* per coordinate block: for a
//! quadrilateral block, which of the three quad types (or octagon types)
//! is positive, if any; for a triangle coordinate, whether it is zero or
//! positive.  Each assignment translates into tableau constraints, and a
//! subtree is abandoned as soon as its linear program goes infeasible.
//!
//! Tableaux are drawn from a pool sized up front from the branch factors.
//! On first visiting a node with type zero, the search constrains the
//! current tableau in place and spins off clones to be picked up when the
//! node is revisited with a non-zero type; `lp_slot` and `next_slot` are
//! index handles into the pool tracking, per level, the tableau for the
//! current decisions and the next free slot.
//!
//! [`TreeEnumeration`] yields every admissible vertex solution, pruning
//! by feasibility, by a domination trie of previously emitted type
//! vectors, and by the zero test.  [`TreeSingleSoln`] stops at the first
//! feasible leaf; it merges the zero/positive quad branches, pins one new
//! triangle coordinate to zero at each depth near the root (so the search
//! cannot drift towards vertex-linking solutions), and branches on the
//! quadrilateral with the fewest feasible sub-branches.

use crate::coords::NormalCoords;
use crate::error::{EnumError, Result};
use crate::maths::Int;
use crate::progress::{ProgressTracker, SearchStatistics};
use crate::triangulation::Triangulation3;

use super::lp::{ExtraConstraint, LpData, LpInitialTableaux, LpInt, LpSystem};
use super::typetrie::TypeTrie;

/// Shared state for both search modes.
pub struct TreeTraversal<T> {
    tab: LpInitialTableaux,
    coords: NormalCoords,
    n_tets: usize,
    n_types: usize,
    type_vec: Vec<u8>,
    type_order: Vec<usize>,
    level: isize,
    /// The level whose type is an octagon, -1 for none so far, or
    /// `n_types` when the system does not store octagons at all.
    oct_level: isize,
    lp: Vec<LpData<T>>,
    /// Pool index of the tableau reflecting the decisions above each level.
    lp_slot: Vec<usize>,
    /// Pool index of the first free slot at each level.
    next_slot: Vec<usize>,
    tmp_lp: Vec<LpData<T>>,
    n_visited: u64,
}

/// Clone one pool entry onto another.
fn clone_slot<T: LpInt>(pool: &mut [LpData<T>], dst: usize, src: usize) {
    debug_assert_ne!(dst, src);
    if dst < src {
        let (lo, hi) = pool.split_at_mut(src);
        lo[dst].init_clone(&hi[0]);
    } else {
        let (lo, hi) = pool.split_at_mut(dst);
        hi[0].init_clone(&lo[src]);
    }
}

impl<T: LpInt> TreeTraversal<T> {
    /// Whether the tree traversal can enumerate in the given system.
    ///
    /// The closed variants carry oracle rows that do not fit the sparse
    /// column layout, and the 4-dimensional system belongs to the double
    /// description back-end; both fall outside this search.
    pub fn supported(coords: NormalCoords) -> bool {
        matches!(
            coords,
            NormalCoords::Std3
                | NormalCoords::Quad3
                | NormalCoords::AlmostNormalStd3
                | NormalCoords::AlmostNormalQuad3
        )
    }

    fn new(
        tri: &Triangulation3,
        coords: NormalCoords,
        extra: Option<&dyn ExtraConstraint>,
        branches_per_quad: usize,
        branches_per_tri: usize,
        enumeration: bool,
    ) -> Result<TreeTraversal<T>> {
        debug_assert!(Self::supported(coords));
        let tab = LpInitialTableaux::new(tri, coords, extra, enumeration)?;
        let n_tets = tri.size();
        let standard = tab.system() == LpSystem::Standard;
        let n_types = if standard { 5 * n_tets } else { n_tets };
        // One branch per level is solved in place, so each level needs
        // branches - 1 clones; the extra slot holds the root.
        let n_tableaux = if standard {
            (branches_per_quad - 1) * n_tets + (branches_per_tri - 1) * n_tets * 4 + 1
        } else {
            (branches_per_quad - 1) * n_tets + 1
        };

        let lp = (0..n_tableaux).map(|_| LpData::reserved(&tab)).collect();
        let tmp_lp = (0..4).map(|_| LpData::reserved(&tab)).collect();

        let mut lp_slot = vec![0; n_types + 1];
        let mut next_slot = vec![0; n_types + 1];
        lp_slot[0] = 0;
        next_slot[0] = 1;

        Ok(TreeTraversal {
            tab,
            coords,
            n_tets,
            n_types,
            type_vec: vec![0; n_types + 1],
            type_order: (0..n_types).collect(),
            level: 0,
            oct_level: if coords.stores_octagons() {
                -1
            } else {
                n_types as isize
            },
            lp,
            lp_slot,
            next_slot,
            tmp_lp,
            n_visited: 0,
        })
    }

    /// Nodes examined so far.
    pub fn visited(&self) -> u64 {
        self.n_visited
    }

    /// The current type vector, for domination bookkeeping and tests.
    pub fn type_vector(&self) -> &[u8] {
        &self.type_vec[..self.n_types]
    }

    /// Move the given type to position `level + 1` of the branching
    /// order, shifting the skipped types back by one.
    fn set_next(&mut self, next_type: usize) {
        let l = (self.level + 1) as usize;
        let pos = l + self.type_order[l..]
            .iter()
            .position(|&t| t == next_type)
            .expect("next type still undecided");
        if pos != l {
            self.type_order[l..=pos].rotate_right(1);
        }
    }

    /// The first triangle type at or after `start_from` that the search
    /// may still pin to zero.
    fn next_triangle_type(&self, start_from: usize) -> Option<usize> {
        (start_from < self.n_types).then_some(start_from)
    }

    /// How many of the four sub-branches of the given quadrilateral type
    /// are feasible below the current node.
    ///
    /// Clones are arranged so that each `x = 0` constraint is shared by
    /// every branch that needs it, and infeasibility of an early clone
    /// short-circuits the branches it subsumes.
    fn feasible_branches(&mut self, quad_type: usize) -> Result<usize> {
        let src = self.lp_slot[(self.level + 1) as usize];
        self.tmp_lp[0].init_clone(&self.lp[src]);

        let (t0, rest) = self.tmp_lp.split_at_mut(1);
        let t0 = &mut t0[0];

        rest[0].init_clone(t0);
        rest[0].constrain_zero(&self.tab, 3 * quad_type + 1)?;
        rest[0].constrain_zero(&self.tab, 3 * quad_type + 2)?;
        rest[0].constrain_positive(&self.tab, 3 * quad_type)?;

        t0.constrain_zero(&self.tab, 3 * quad_type)?;
        if !t0.is_feasible() {
            // Branches 0, 2 and 3 share the constraint just added.
            return Ok(rest[0].is_feasible() as usize);
        }

        rest[1].init_clone(t0);
        rest[1].constrain_zero(&self.tab, 3 * quad_type + 2)?;
        rest[1].constrain_positive(&self.tab, 3 * quad_type + 1)?;

        t0.constrain_zero(&self.tab, 3 * quad_type + 1)?;
        if !t0.is_feasible() {
            return Ok(rest[0].is_feasible() as usize + rest[1].is_feasible() as usize);
        }

        rest[2].init_clone(t0);
        rest[2].constrain_positive(&self.tab, 3 * quad_type + 2)?;

        t0.constrain_zero(&self.tab, 3 * quad_type + 2)?;

        Ok(t0.is_feasible() as usize
            + rest[0].is_feasible() as usize
            + rest[1].is_feasible() as usize
            + rest[2].is_feasible() as usize)
    }

    /// A lexicographic estimate of the fraction of the tree searched,
    /// weighting every branch uniformly among its siblings.
    fn percent(&self) -> f64 {
        let mut percent = 0.0;
        let mut range = 100.0;
        let mut quads_remaining = self.n_tets;
        for i in 0..self.n_types {
            if range <= 0.01 {
                break;
            }
            let idx = self.type_order[i];
            let t = self.type_vec[idx] as f64;
            if idx >= self.n_tets {
                range /= 2.0;
                percent += range * t;
            } else {
                let i = i as isize;
                if self.oct_level == self.n_types as isize || self.oct_level < i {
                    // Octagons already used, or never available.
                    range /= 4.0;
                    percent += range * t;
                } else if self.oct_level == i {
                    let den = (3 * quads_remaining + 4) as f64;
                    range /= den;
                    percent += range * ((den - 3.0) + (t - 4.0));
                } else {
                    // Octagons may still be claimed here or deeper.
                    let den = (3 * quads_remaining + 4) as f64;
                    range = (range * (den - 3.0)) / (4.0 * den);
                    percent += range * t;
                }
                quads_remaining -= 1;
            }
        }
        percent
    }

    /// Extract the solution at the current leaf as a coordinate vector
    /// in this search's coordinate system.
    fn build_surface(&self) -> Vec<Int> {
        let slot = self.lp_slot[self.n_types];
        let v = self.lp[slot].extract_solution(&self.tab, &self.type_vec);
        let perm = self.tab.column_perm();
        let n = self.n_tets;

        match self.coords {
            NormalCoords::Quad3 | NormalCoords::Std3 => v,
            NormalCoords::AlmostNormalQuad3 => {
                let mut an = vec![Int::ZERO; 6 * n];
                for i in 0..n {
                    for j in 0..3 {
                        an[6 * i + j] = v[3 * i + j].clone();
                    }
                }
                if self.oct_level >= 0 && self.oct_level < self.n_types as isize {
                    let lvl = self.type_order[self.oct_level as usize];
                    let oct_tet = perm[3 * lvl] / 3;
                    let oct_type = (self.type_vec[lvl] - 4) as usize;
                    an[6 * oct_tet + 3 + oct_type] = v[3 * oct_tet + (oct_type + 1) % 3].clone();
                    for j in 0..3 {
                        an[6 * oct_tet + j] = Int::ZERO;
                    }
                }
                an
            }
            NormalCoords::AlmostNormalStd3 => {
                let mut an = vec![Int::ZERO; 10 * n];
                for i in 0..n {
                    for j in 0..7 {
                        an[10 * i + j] = v[7 * i + j].clone();
                    }
                }
                if self.oct_level >= 0 && self.oct_level < self.n_types as isize {
                    let lvl = self.type_order[self.oct_level as usize];
                    let oct_tet = perm[3 * lvl] / 7;
                    let oct_type = (self.type_vec[lvl] - 4) as usize;
                    an[10 * oct_tet + 7 + oct_type] =
                        v[7 * oct_tet + 4 + (oct_type + 1) % 3].clone();
                    for j in 0..3 {
                        an[10 * oct_tet + 4 + j] = Int::ZERO;
                    }
                }
                an
            }
            _ => unreachable!("unsupported tree traversal system"),
        }
    }
}

/// Enumerates every admissible vertex solution of the system, one call
/// to [`next`](TreeEnumeration::next) per solution.
pub struct TreeEnumeration<T> {
    base: TreeTraversal<T>,
    solns: TypeTrie,
    n_solns: u64,
    last_non_zero: isize,
}

impl<T: LpInt> TreeEnumeration<T> {
    pub fn new(tri: &Triangulation3, coords: NormalCoords) -> Result<TreeEnumeration<T>> {
        let octagons = coords.stores_octagons();
        let base = TreeTraversal::new(
            tri,
            coords,
            None,
            if octagons { 7 } else { 4 },
            2,
            true,
        )?;
        Ok(TreeEnumeration {
            base,
            solns: TypeTrie::new(if octagons { 7 } else { 4 }),
            n_solns: 0,
            last_non_zero: -1,
        })
    }

    pub fn solutions(&self) -> u64 {
        self.n_solns
    }

    pub fn statistics(&self) -> SearchStatistics {
        SearchStatistics {
            nodes_visited: self.base.visited(),
            solutions: self.n_solns,
        }
    }

    /// The solution vector at the current leaf.
    pub fn build_surface(&self) -> Vec<Int> {
        self.base.build_surface()
    }

    /// Advance to the next admissible vertex solution.
    ///
    /// Returns `Ok(true)` when a new solution has been found (read it
    /// with [`build_surface`](Self::build_surface)), `Ok(false)` when the
    /// search is exhausted, and `Err(Cancelled)` if the tracker asked us
    /// to stop.
    pub fn next(&mut self, tracker: Option<&ProgressTracker>) -> Result<bool> {
        let b = &mut self.base;

        if self.last_non_zero < 0 {
            // The very first call: prepare the root node.
            b.lp[0].init_start(&b.tab)?;
            b.n_visited += 1;
            if !b.lp[0].is_feasible() {
                return Ok(false);
            }
        } else {
            // Restart from the previous solution.  Incrementing any
            // trailing zero would just re-dominate that solution, so
            // resume at its last non-zero digit.
            b.level = self.last_non_zero;
            b.type_vec[b.type_order[b.level as usize]] += 1;
        }

        loop {
            if let Some(t) = tracker {
                if !t.set_percent(b.percent()) {
                    return Err(EnumError::Cancelled);
                }
            }

            let idx = b.type_order[b.level as usize];

            // Range check, with the quad range spilling over into the
            // octagon types when the one octagon is still unclaimed.
            let mut out_of_range = false;
            if b.type_vec[idx] == 4 && idx < b.n_tets {
                if b.oct_level < 0 {
                    b.oct_level = b.level;
                } else {
                    out_of_range = true;
                }
            } else if b.type_vec[idx] == 7 {
                // Free the octagon for use elsewhere in the tree.
                b.oct_level = -1;
                out_of_range = true;
            } else if idx >= b.n_tets && b.type_vec[idx] == 2 {
                out_of_range = true;
            }

            if out_of_range {
                b.type_vec[idx] = 0;
                b.level -= 1;
                if b.level < 0 {
                    return Ok(false);
                }
                b.type_vec[b.type_order[b.level as usize]] += 1;
                self.last_non_zero = b.level;
                continue;
            }

            b.n_visited += 1;

            // Domination test.  A zero type cannot change the outcome
            // relative to its parent, which already passed.
            if b.type_vec[idx] != 0 && self.solns.dominates(&b.type_vec[..b.n_types]) {
                b.type_vec[idx] += 1;
                self.last_non_zero = b.level;
                continue;
            }

            // The zero test happens later: the zero node still has to
            // spin off its clones.

            let lvl = b.level as usize;
            if b.type_vec[idx] == 0 {
                // First visit: constrain the parent tableau in place,
                // cloning for the non-zero types as the shared x = 0
                // prefixes become available.
                let parent = b.lp_slot[lvl];
                b.lp_slot[lvl + 1] = parent;

                if idx < b.n_tets {
                    let free = b.next_slot[lvl];
                    if b.oct_level < 0 {
                        b.next_slot[lvl + 1] = free + 6;

                        // Types 1, 5 and 6 inherit no constraints.
                        clone_slot(&mut b.lp, free, parent);
                        clone_slot(&mut b.lp, free + 4, parent);
                        clone_slot(&mut b.lp, free + 5, parent);

                        b.lp[parent].constrain_zero(&b.tab, 3 * idx)?;

                        // Types 2 and 4 inherit x_{3k} = 0.
                        clone_slot(&mut b.lp, free + 1, parent);
                        clone_slot(&mut b.lp, free + 3, parent);

                        b.lp[parent].constrain_zero(&b.tab, 3 * idx + 1)?;

                        // Type 3 inherits x_{3k} = x_{3k+1} = 0.
                        clone_slot(&mut b.lp, free + 2, parent);

                        b.lp[parent].constrain_zero(&b.tab, 3 * idx + 2)?;
                    } else {
                        b.next_slot[lvl + 1] = free + 3;

                        clone_slot(&mut b.lp, free, parent);
                        b.lp[parent].constrain_zero(&b.tab, 3 * idx)?;
                        clone_slot(&mut b.lp, free + 1, parent);
                        b.lp[parent].constrain_zero(&b.tab, 3 * idx + 1)?;
                        clone_slot(&mut b.lp, free + 2, parent);
                        b.lp[parent].constrain_zero(&b.tab, 3 * idx + 2)?;
                    }
                } else {
                    // Triangle column: a single x = 0 constraint, and a
                    // single clone for the positive branch.
                    let free = b.next_slot[lvl];
                    b.next_slot[lvl + 1] = free + 1;
                    clone_slot(&mut b.lp, free, parent);
                    b.lp[parent].constrain_zero(&b.tab, 2 * b.n_tets + idx)?;
                }
            } else {
                // Revisit: pick up the clone spun off at type zero and
                // add the constraints distinguishing this type.
                if idx < b.n_tets {
                    let slot = b.next_slot[lvl] + (b.type_vec[idx] - 1) as usize;
                    b.lp_slot[lvl + 1] = slot;
                    match b.type_vec[idx] {
                        1 => {
                            b.lp[slot].constrain_zero(&b.tab, 3 * idx + 1)?;
                            b.lp[slot].constrain_zero(&b.tab, 3 * idx + 2)?;
                            b.lp[slot].constrain_positive(&b.tab, 3 * idx)?;
                        }
                        2 => {
                            b.lp[slot].constrain_zero(&b.tab, 3 * idx + 2)?;
                            b.lp[slot].constrain_positive(&b.tab, 3 * idx + 1)?;
                        }
                        3 => {
                            b.lp[slot].constrain_positive(&b.tab, 3 * idx + 2)?;
                        }
                        4 => {
                            b.lp[slot].constrain_oct(&b.tab, 3 * idx + 1, 3 * idx + 2)?;
                        }
                        5 => {
                            b.lp[slot].constrain_zero(&b.tab, 3 * idx + 1)?;
                            b.lp[slot].constrain_oct(&b.tab, 3 * idx, 3 * idx + 2)?;
                        }
                        6 => {
                            b.lp[slot].constrain_zero(&b.tab, 3 * idx + 2)?;
                            b.lp[slot].constrain_oct(&b.tab, 3 * idx, 3 * idx + 1)?;
                        }
                        _ => unreachable!("type out of range"),
                    }
                } else {
                    let slot = b.next_slot[lvl];
                    b.lp_slot[lvl + 1] = slot;
                    b.lp[slot].constrain_positive(&b.tab, 2 * b.n_tets + idx)?;
                }
            }

            // The zero test proper.
            if self.last_non_zero < 0 && b.level == b.n_types as isize - 1 {
                b.type_vec[idx] += 1;
                self.last_non_zero = b.level;
                continue;
            }

            if b.lp[b.lp_slot[lvl + 1]].is_feasible() {
                if b.level < b.n_types as isize - 1 {
                    b.level += 1;
                } else {
                    self.solns.insert(&b.type_vec[..b.n_types]);
                    self.n_solns += 1;
                    return Ok(true);
                }
            } else {
                b.type_vec[idx] += 1;
                self.last_non_zero = b.level;
            }
        }
    }
}

/// Finds one feasible (not necessarily vertex) solution, or reports that
/// none exists.
pub struct TreeSingleSoln<T> {
    base: TreeTraversal<T>,
    next_zero_level: isize,
}

impl<T: LpInt> TreeSingleSoln<T> {
    pub fn new(
        tri: &Triangulation3,
        coords: NormalCoords,
        extra: Option<&dyn ExtraConstraint>,
    ) -> Result<TreeSingleSoln<T>> {
        let octagons = coords.stores_octagons();
        let base = TreeTraversal::new(
            tri,
            coords,
            extra,
            if octagons { 6 } else { 3 },
            2,
            false,
        )?;
        Ok(TreeSingleSoln {
            base,
            next_zero_level: 0,
        })
    }

    pub fn statistics(&self) -> SearchStatistics {
        SearchStatistics {
            nodes_visited: self.base.visited(),
            solutions: 0,
        }
    }

    pub fn build_surface(&self) -> Vec<Int> {
        self.base.build_surface()
    }

    /// Run the search.  Returns `Ok(true)` with the solution available
    /// through [`build_surface`](Self::build_surface), or `Ok(false)` if
    /// no solution exists.
    ///
    /// Unlike enumeration there is no domination test, and the three
    /// quadrilateral branches are `(>=0, 0, 0)`, `(0, >=1, 0)` and
    /// `(0, 0, >=1)`: the zero and first-positive cases are merged, and
    /// split apart again only at the leaf.
    pub fn find(&mut self, tracker: Option<&ProgressTracker>) -> Result<bool> {
        let b = &mut self.base;

        b.lp[0].init_start(&b.tab)?;
        b.n_visited += 1;
        if !b.lp[0].is_feasible() {
            return Ok(false);
        }

        // Kick off the vertex-link-avoidance regime on a triangle type.
        let Some(mut use_triangle) = b.next_triangle_type(b.n_tets) else {
            return Ok(false);
        };
        b.level = -1;
        b.set_next(use_triangle);
        b.level = 0;

        loop {
            if let Some(t) = tracker {
                if !t.set_percent(b.percent()) {
                    return Err(EnumError::Cancelled);
                }
            }

            let idx = b.type_order[b.level as usize];

            let mut out_of_range = false;
            if b.type_vec[idx] == 4 && idx < b.n_tets {
                if b.oct_level < 0 {
                    b.oct_level = b.level;
                } else {
                    out_of_range = true;
                }
            } else if b.type_vec[idx] == 7 {
                b.oct_level = -1;
                out_of_range = true;
            } else if idx >= b.n_tets && b.type_vec[idx] == 2 {
                out_of_range = true;
            }

            if out_of_range {
                b.type_vec[idx] = 0;
                b.level -= 1;
                if b.level < 0 {
                    return Ok(false);
                }
                b.type_vec[b.type_order[b.level as usize]] += 1;
                continue;
            }

            b.n_visited += 1;

            let lvl = b.level as usize;
            if b.type_vec[idx] == 0 {
                if idx < b.n_tets {
                    // Merge types 0 and 1: step straight to type 1,
                    // which keeps the parent tableau in place with
                    // x_{3k+1} = x_{3k+2} = 0 and no positivity bound.
                    b.type_vec[idx] = 1;
                    let parent = b.lp_slot[lvl];
                    b.lp_slot[lvl + 1] = parent;
                    let free = b.next_slot[lvl];

                    if b.oct_level < 0 {
                        b.next_slot[lvl + 1] = free + 5;

                        // Types 3, 4 and 5 inherit no constraints.
                        clone_slot(&mut b.lp, free + 1, parent);
                        clone_slot(&mut b.lp, free + 2, parent);
                        clone_slot(&mut b.lp, free + 3, parent);

                        b.lp[parent].constrain_zero(&b.tab, 3 * idx + 2)?;

                        // Types 2 and 6 inherit x_{3k+2} = 0.
                        clone_slot(&mut b.lp, free, parent);
                        clone_slot(&mut b.lp, free + 4, parent);

                        b.lp[parent].constrain_zero(&b.tab, 3 * idx + 1)?;
                    } else {
                        b.next_slot[lvl + 1] = free + 2;

                        clone_slot(&mut b.lp, free + 1, parent);
                        b.lp[parent].constrain_zero(&b.tab, 3 * idx + 2)?;
                        clone_slot(&mut b.lp, free, parent);
                        b.lp[parent].constrain_zero(&b.tab, 3 * idx + 1)?;
                    }
                } else {
                    let parent = b.lp_slot[lvl];
                    b.lp_slot[lvl + 1] = parent;
                    let free = b.next_slot[lvl];
                    b.next_slot[lvl + 1] = free + 1;
                    clone_slot(&mut b.lp, free, parent);
                    b.lp[parent].constrain_zero(&b.tab, 2 * b.n_tets + idx)?;
                }
            } else if b.type_vec[idx] != 1 || idx >= b.n_tets {
                // Pick up the clone and add the missing constraints.
                // (Quad type 1 keeps the in-place parent tableau and
                // needs nothing further.)
                if idx < b.n_tets {
                    let slot = b.next_slot[lvl] + (b.type_vec[idx] - 2) as usize;
                    b.lp_slot[lvl + 1] = slot;
                    match b.type_vec[idx] {
                        2 => {
                            b.lp[slot].constrain_zero(&b.tab, 3 * idx)?;
                            b.lp[slot].constrain_positive(&b.tab, 3 * idx + 1)?;
                        }
                        3 => {
                            b.lp[slot].constrain_zero(&b.tab, 3 * idx)?;
                            b.lp[slot].constrain_zero(&b.tab, 3 * idx + 1)?;
                            b.lp[slot].constrain_positive(&b.tab, 3 * idx + 2)?;
                        }
                        4 => {
                            b.lp[slot].constrain_zero(&b.tab, 3 * idx)?;
                            b.lp[slot].constrain_oct(&b.tab, 3 * idx + 1, 3 * idx + 2)?;
                        }
                        5 => {
                            b.lp[slot].constrain_zero(&b.tab, 3 * idx + 1)?;
                            b.lp[slot].constrain_oct(&b.tab, 3 * idx, 3 * idx + 2)?;
                        }
                        // Type 6 already inherits x_{3k+2} = 0 from its
                        // clone, so only the merge itself remains.
                        6 => {
                            b.lp[slot].constrain_oct(&b.tab, 3 * idx, 3 * idx + 1)?;
                        }
                        _ => unreachable!("type out of range"),
                    }
                } else {
                    let slot = b.next_slot[lvl];
                    b.lp_slot[lvl + 1] = slot;
                    b.lp[slot].constrain_positive(&b.tab, 2 * b.n_tets + idx)?;
                }
            }

            if b.lp[b.lp_slot[lvl + 1]].is_feasible() {
                if b.level < b.n_types as isize - 1 {
                    if b.level == self.next_zero_level {
                        // Still forcing triangles to zero near the root.
                        if b.type_vec[idx] == 0 {
                            // A triangle was just pinned to zero; move on
                            // to its own quadrilateral type next.
                            b.set_next((idx - b.n_tets) / 4);
                        } else {
                            // The zero branch for this triangle is done;
                            // pin the next triangle instead.
                            match b.next_triangle_type(idx + 1) {
                                Some(t) => {
                                    use_triangle = t;
                                    b.set_next(use_triangle);
                                    self.next_zero_level += 1;
                                }
                                None => {
                                    // Every remaining solution carries a
                                    // full set of positive triangles:
                                    // vertex links we do not want.
                                    return Ok(false);
                                }
                            }
                        }
                    } else if b.type_order[lvl + 1] < b.n_tets {
                        // Branch next on the quadrilateral with the
                        // fewest feasible sub-branches.
                        let mut best_quad = None;
                        let mut min_branches = 5;
                        for i in lvl + 1..b.n_types {
                            let cand = b.type_order[i];
                            if cand < b.n_tets {
                                let branches = b.feasible_branches(cand)?;
                                if branches < min_branches {
                                    min_branches = branches;
                                    best_quad = Some(cand);
                                    if branches == 0 {
                                        break;
                                    }
                                }
                            }
                        }
                        if let Some(q) = best_quad {
                            b.set_next(q);
                        }
                    }
                    b.level += 1;
                } else {
                    // A feasible leaf.  The merged type-1 branches never
                    // enforced positivity, so the solution need not use
                    // those quadrilaterals: try to retire each back to
                    // type 0, and where that fails enact the positivity
                    // substitution so extraction reads correctly.
                    let slot = b.lp_slot[lvl + 1];
                    for i in 0..b.n_tets {
                        if b.type_vec[i] == 1 {
                            b.tmp_lp[0].init_clone(&b.lp[slot]);
                            b.tmp_lp[0].constrain_zero(&b.tab, 3 * i)?;
                            if b.tmp_lp[0].is_feasible() {
                                b.lp[slot].constrain_zero(&b.tab, 3 * i)?;
                                b.type_vec[i] = 0;
                            } else {
                                b.lp[slot].constrain_positive(&b.tab, 3 * i)?;
                            }
                        }
                    }
                    return Ok(true);
                }
            } else {
                b.type_vec[idx] += 1;
            }
        }
    }
}
