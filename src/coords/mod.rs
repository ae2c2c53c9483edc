// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The coordinate-system registry.
//!
//! Each supported coordinate system is a value of [`NormalCoords`]; the
//! enum carries everything the engine needs to size vectors, build
//! matching equations and impose admissibility constraints.  Dispatch on
//! the system happens once, at the enumeration entry points; the
//! algorithm back-ends themselves are generic only over numeric and
//! bitmask widths.
//!
//! # Disc types within a tetrahedron
//!
//! Standard coordinates use seven disc types per tetrahedron: triangle
//! types 0..3 (the triangle at vertex `t`, parallel to the opposite
//! face), then quadrilateral types 0..2.  Quadrilateral type `q`
//! separates the two vertices of edge `q` from the two vertices of the
//! opposite edge, so [`QUAD_SEPARATING`]`[a][b]` names the quad keeping
//! `a` and `b` together, and [`QUAD_MEETING`]`[a][b]` the two quads
//! crossing edge `ab`.  Almost normal systems append octagon types 0..2,
//! octagon `o` meeting the same arcs as the two quads other than `o`.

pub mod constraints;
pub mod matching;

use strum_macros::EnumIter;

pub use constraints::ValidityConstraints;
pub use matching::SlopeOracle;

/// The quad type keeping vertices `a` and `b` together.
/// The diagonal is unused.
pub const QUAD_SEPARATING: [[usize; 4]; 4] = [
    [usize::MAX, 0, 1, 2],
    [0, usize::MAX, 2, 1],
    [1, 2, usize::MAX, 0],
    [2, 1, 0, usize::MAX],
];

/// The two quad types meeting edge `ab`.  The diagonal is unused.
pub const QUAD_MEETING: [[[usize; 2]; 4]; 4] = [
    [[3, 3], [1, 2], [0, 2], [0, 1]],
    [[1, 2], [3, 3], [0, 1], [0, 2]],
    [[0, 2], [0, 1], [3, 3], [1, 2]],
    [[0, 1], [0, 2], [1, 2], [3, 3]],
];

/// Vertex pairs split by each quad type: quad `q` separates
/// `{QUAD_DEFN[q][0], QUAD_DEFN[q][1]}` from the other pair.
pub const QUAD_DEFN: [[usize; 4]; 3] = [[0, 1, 2, 3], [0, 2, 1, 3], [0, 3, 1, 2]];

/// The partner of each vertex under each quad type.
pub const QUAD_PARTNER: [[usize; 4]; 3] = [[1, 0, 3, 2], [2, 3, 0, 1], [3, 2, 1, 0]];

/// A coordinate system for normal or almost normal surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum NormalCoords {
    /// Standard tri-quad coordinates: 7 per tetrahedron.
    Std3,
    /// Quadrilateral coordinates: 3 per tetrahedron.
    Quad3,
    /// Standard almost normal coordinates: 10 per tetrahedron.
    AlmostNormalStd3,
    /// Quad-octagon coordinates: 6 per tetrahedron.
    AlmostNormalQuad3,
    /// Quad coordinates with closed-surface slope equations appended.
    QuadClosed3,
    /// Quad-octagon coordinates with closed-surface slope equations.
    AlmostNormalQuadClosed3,
    /// Standard coordinates for 4-manifolds: 15 per pentachoron
    /// (5 tetrahedron types followed by 10 prism types).
    Std4,
}

impl NormalCoords {
    /// Coordinates per simplex.
    pub fn block_size(self) -> usize {
        match self {
            NormalCoords::Std3 => 7,
            NormalCoords::Quad3 | NormalCoords::QuadClosed3 => 3,
            NormalCoords::AlmostNormalStd3 => 10,
            NormalCoords::AlmostNormalQuad3 | NormalCoords::AlmostNormalQuadClosed3 => 6,
            NormalCoords::Std4 => 15,
        }
    }

    /// Total vector length over `n` simplices.
    pub fn dimension(self, n_simplices: usize) -> usize {
        self.block_size() * n_simplices
    }

    /// Whether vectors carry triangle (or tetrahedron-piece) coordinates.
    pub fn stores_triangles(self) -> bool {
        matches!(
            self,
            NormalCoords::Std3 | NormalCoords::AlmostNormalStd3 | NormalCoords::Std4
        )
    }

    /// Whether vectors carry octagon coordinates.
    pub fn stores_octagons(self) -> bool {
        matches!(
            self,
            NormalCoords::AlmostNormalStd3
                | NormalCoords::AlmostNormalQuad3
                | NormalCoords::AlmostNormalQuadClosed3
        )
    }

    /// Whether this system lives on 4-dimensional triangulations.
    pub fn is_dim4(self) -> bool {
        matches!(self, NormalCoords::Std4)
    }

    /// Whether this system appends closed-surface slope equations.
    pub fn is_closed_variant(self) -> bool {
        matches!(
            self,
            NormalCoords::QuadClosed3 | NormalCoords::AlmostNormalQuadClosed3
        )
    }

    /// The quadrilateral-only system this standard system reduces to.
    pub fn reduced(self) -> Option<NormalCoords> {
        match self {
            NormalCoords::Std3 => Some(NormalCoords::Quad3),
            NormalCoords::AlmostNormalStd3 => Some(NormalCoords::AlmostNormalQuad3),
            _ => None,
        }
    }

    /// A stable identifier for the persisted representation.
    pub fn id(self) -> &'static str {
        match self {
            NormalCoords::Std3 => "std3",
            NormalCoords::Quad3 => "quad3",
            NormalCoords::AlmostNormalStd3 => "an-std3",
            NormalCoords::AlmostNormalQuad3 => "an-quad3",
            NormalCoords::QuadClosed3 => "quad-closed3",
            NormalCoords::AlmostNormalQuadClosed3 => "an-quad-closed3",
            NormalCoords::Std4 => "std4",
        }
    }

    /// The system with the given persisted identifier.
    pub fn from_id(id: &str) -> Option<NormalCoords> {
        use strum::IntoEnumIterator;
        NormalCoords::iter().find(|c| c.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_quad_tables_are_consistent() {
        for a in 0..4 {
            for b in 0..4 {
                if a == b {
                    continue;
                }
                let s = QUAD_SEPARATING[a][b];
                assert_eq!(s, QUAD_SEPARATING[b][a]);
                // The separating quad pairs a with b.
                assert_eq!(QUAD_PARTNER[s][a], b);
                // The two meeting quads are exactly the other two types.
                let m = QUAD_MEETING[a][b];
                assert_ne!(m[0], s);
                assert_ne!(m[1], s);
                assert_ne!(m[0], m[1]);
            }
        }
        for (q, defn) in QUAD_DEFN.iter().enumerate() {
            assert_eq!(QUAD_SEPARATING[defn[0]][defn[1]], q);
            assert_eq!(QUAD_SEPARATING[defn[2]][defn[3]], q);
        }
    }

    #[test]
    fn test_block_sizes() {
        assert_eq!(NormalCoords::Std3.dimension(3), 21);
        assert_eq!(NormalCoords::Quad3.dimension(3), 9);
        assert_eq!(NormalCoords::AlmostNormalStd3.dimension(2), 20);
        assert_eq!(NormalCoords::Std4.dimension(2), 30);
    }

    #[test]
    fn test_id_round_trip() {
        for c in NormalCoords::iter() {
            assert_eq!(NormalCoords::from_id(c.id()), Some(c));
        }
        assert_eq!(NormalCoords::from_id("nonsense"), None);
    }

    #[test]
    fn test_reduced_counterparts() {
        assert_eq!(NormalCoords::Std3.reduced(), Some(NormalCoords::Quad3));
        assert_eq!(
            NormalCoords::AlmostNormalStd3.reduced(),
            Some(NormalCoords::AlmostNormalQuad3)
        );
        assert_eq!(NormalCoords::Quad3.reduced(), None);
    }
}
