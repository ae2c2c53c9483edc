// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Combinatorial validity constraints.
//!
//! Each constraint is a set of coordinate positions of which at most one
//! may be non-zero; a vector satisfying every constraint is *admissible*.
//! Admissibility is not preserved by addition, but inadmissibility is,
//! which is what lets the enumeration algorithms discard combinations
//! early using nothing but support bitmasks.
//!
//! Constraints come in two families, both expressed relative to the
//! per-simplex coordinate block: a *local* family adds one constraint per
//! block (the quadrilateral constraints), while a *global* constraint
//! collects the named positions from every block at once (the
//! one-octagon-in-total constraint).

use crate::bitmask::{mask_of, Bitmask};
use crate::maths::Int;

use super::NormalCoords;

/// A set of validity constraints over vectors with a fixed block layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidityConstraints {
    block_size: usize,
    n_blocks: usize,
    /// Position patterns relative to the start of each block.
    local: Vec<Vec<usize>>,
    /// Patterns contributing to one constraint spanning all blocks.
    global: Vec<Vec<usize>>,
}

impl ValidityConstraints {
    /// An empty constraint set (every vector is admissible).
    pub fn none() -> ValidityConstraints {
        ValidityConstraints::default()
    }

    /// An empty constraint set over the given block structure.
    pub fn new(block_size: usize, n_blocks: usize) -> ValidityConstraints {
        ValidityConstraints {
            block_size,
            n_blocks,
            local: Vec::new(),
            global: Vec::new(),
        }
    }

    /// Add one local constraint per block, using the given positions
    /// relative to the start of each block.
    pub fn add_local(&mut self, pattern: &[usize]) {
        debug_assert!(pattern.iter().all(|&p| p < self.block_size));
        self.local.push(pattern.to_vec());
    }

    /// Add a single global constraint collecting the given positions from
    /// every block.
    pub fn add_global(&mut self, pattern: &[usize]) {
        debug_assert!(pattern.iter().all(|&p| p < self.block_size));
        self.global.push(pattern.to_vec());
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.global.is_empty()
    }

    /// The constraints expanded to explicit coordinate-position sets.
    pub fn sets(&self) -> Vec<Vec<usize>> {
        let mut out = Vec::with_capacity(self.local.len() * self.n_blocks + self.global.len());
        for pattern in &self.local {
            for b in 0..self.n_blocks {
                out.push(pattern.iter().map(|&p| b * self.block_size + p).collect());
            }
        }
        for pattern in &self.global {
            let mut set = Vec::with_capacity(pattern.len() * self.n_blocks);
            for b in 0..self.n_blocks {
                set.extend(pattern.iter().map(|&p| b * self.block_size + p));
            }
            out.push(set);
        }
        out
    }

    /// The constraints as bitmasks of the given vector length.
    pub fn bitmasks<B: Bitmask>(&self, len: usize) -> Vec<B> {
        self.sets().iter().map(|s| mask_of(len, s)).collect()
    }

    /// Whether the given vector satisfies every constraint.
    pub fn admissible(&self, v: &[Int]) -> bool {
        self.sets()
            .iter()
            .all(|set| set.iter().filter(|&&i| !v[i].is_zero()).count() <= 1)
    }

    /// The embedded-surface constraints for a coordinate system over
    /// `n_simplices` simplices.
    pub fn for_coords(coords: NormalCoords, n_simplices: usize) -> ValidityConstraints {
        let mut c = ValidityConstraints::new(coords.block_size(), n_simplices);
        match coords {
            NormalCoords::Std3 => c.add_local(&[4, 5, 6]),
            NormalCoords::Quad3 | NormalCoords::QuadClosed3 => c.add_local(&[0, 1, 2]),
            NormalCoords::AlmostNormalStd3 => {
                c.add_local(&[4, 5, 6, 7, 8, 9]);
                c.add_global(&[7, 8, 9]);
            }
            NormalCoords::AlmostNormalQuad3 | NormalCoords::AlmostNormalQuadClosed3 => {
                c.add_local(&[0, 1, 2, 3, 4, 5]);
                c.add_global(&[3, 4, 5]);
            }
            NormalCoords::Std4 => {
                // Two prisms in the same pentachoron are compatible only
                // when their central edges are disjoint.
                use crate::triangulation::dim4::PENT_EDGE_VERTICES;
                for (e, &(a, b)) in PENT_EDGE_VERTICES.iter().enumerate() {
                    for (f, &(x, y)) in PENT_EDGE_VERTICES.iter().enumerate().skip(e + 1) {
                        if a == x || a == y || b == x || b == y {
                            c.add_local(&[5 + e, 5 + f]);
                        }
                    }
                }
            }
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmask::Bitmask64;

    fn v(xs: &[i64]) -> Vec<Int> {
        xs.iter().map(|&x| Int::from(x)).collect()
    }

    #[test]
    fn test_quad_constraints() {
        let c = ValidityConstraints::for_coords(NormalCoords::Quad3, 2);
        assert_eq!(c.sets(), vec![vec![0, 1, 2], vec![3, 4, 5]]);
        assert!(c.admissible(&v(&[1, 0, 0, 0, 2, 0])));
        assert!(!c.admissible(&v(&[1, 1, 0, 0, 0, 0])));
    }

    #[test]
    fn test_standard_constraints_ignore_triangles() {
        let c = ValidityConstraints::for_coords(NormalCoords::Std3, 1);
        assert!(c.admissible(&v(&[1, 1, 1, 1, 1, 0, 0])));
        assert!(!c.admissible(&v(&[0, 0, 0, 0, 1, 1, 0])));
    }

    #[test]
    fn test_octagon_constraints() {
        let c = ValidityConstraints::for_coords(NormalCoords::AlmostNormalQuad3, 2);
        // One quad per tetrahedron is fine.
        assert!(c.admissible(&v(&[1, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0])));
        // A quad and an octagon in the same tetrahedron is not.
        assert!(!c.admissible(&v(&[1, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0])));
        // Octagons in two different tetrahedra break the global constraint.
        assert!(!c.admissible(&v(&[0, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0])));
        // A single octagon somewhere is fine.
        assert!(c.admissible(&v(&[0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 0, 0])));
    }

    #[test]
    fn test_dim4_prism_pairs() {
        let c = ValidityConstraints::for_coords(NormalCoords::Std4, 1);
        // Each pentachoron edge meets six others, giving 30 pairs.
        assert_eq!(c.sets().len(), 30);
        // Prisms along edges 01 and 23 are disjoint, hence compatible.
        let mut x = vec![Int::ZERO; 15];
        x[5] = Int::ONE; // edge 01
        x[5 + 7] = Int::ONE; // edge 23
        assert!(c.admissible(&x));
        // Prisms along edges 01 and 02 share vertex 0.
        let mut y = vec![Int::ZERO; 15];
        y[5] = Int::ONE;
        y[5 + 1] = Int::ONE;
        assert!(!c.admissible(&y));
    }

    #[test]
    fn test_bitmask_expansion() {
        let c = ValidityConstraints::for_coords(NormalCoords::Quad3, 1);
        let masks: Vec<Bitmask64> = c.bitmasks(3);
        assert_eq!(masks.len(), 1);
        assert!(masks[0].get(0) && masks[0].get(1) && masks[0].get(2));
    }

    #[test]
    fn test_none_is_empty() {
        assert!(ValidityConstraints::none().is_empty());
        assert!(ValidityConstraints::none().admissible(&v(&[5, 5, 5])));
    }
}
