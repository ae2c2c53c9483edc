// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Matching equation builders.
//!
//! A normal surface is admissible only if adjacent simplices agree on the
//! number of normal arcs crossing every shared face.  For standard
//! coordinate systems this gives three equations per interior triangle
//! (one per arc type); for quadrilateral-only systems, one equation per
//! interior edge; for the 4-dimensional standard system, four equations
//! per interior tetrahedron.  The closed variants append slope equations
//! obtained from an external oracle.

use crate::error::{EnumError, Result};
use crate::maths::{Int, MatrixInt};
use crate::triangulation::{Triangulation3, Triangulation4};

use super::{NormalCoords, QUAD_MEETING, QUAD_SEPARATING};

/// Supplies the two slope equations constraining spun-normal surfaces to
/// be closed.  Treated as an oracle: the engine uses its output verbatim,
/// and expects `None` whenever the triangulation fails the oracle's own
/// preconditions (one cusp, suitable geometry) or the oracle had to
/// retriangulate.
pub trait SlopeOracle {
    /// A 2 x (3n) integer matrix of slope equations, or `None` if
    /// unavailable for this triangulation.
    fn slope_equations(&self, tri: &Triangulation3) -> Option<MatrixInt>;
}

/// Build the matching equations for a 3-dimensional coordinate system.
///
/// Fails with `InvalidCoordinateSystem` when the system's structural
/// preconditions do not hold: quadrilateral systems need a valid
/// triangulation, and the closed variants additionally need an ideal,
/// oriented triangulation together with a successful oracle.
pub fn matching_equations(
    tri: &Triangulation3,
    coords: NormalCoords,
    oracle: Option<&dyn SlopeOracle>,
) -> Result<MatrixInt> {
    match coords {
        NormalCoords::Std3 => Ok(standard_equations(tri, 7, false)),
        NormalCoords::AlmostNormalStd3 => Ok(standard_equations(tri, 10, true)),
        NormalCoords::Quad3 => {
            require_valid(tri)?;
            Ok(quad_equations(tri, 3, false))
        }
        NormalCoords::AlmostNormalQuad3 => {
            require_valid(tri)?;
            Ok(quad_equations(tri, 6, true))
        }
        NormalCoords::QuadClosed3 | NormalCoords::AlmostNormalQuadClosed3 => {
            require_valid(tri)?;
            if !tri.is_ideal() || !tri.is_orientable() {
                return Err(EnumError::InvalidCoordinateSystem(
                    "closed coordinate variants need an ideal oriented triangulation".into(),
                ));
            }
            let oracle = oracle.ok_or_else(|| {
                EnumError::InvalidCoordinateSystem("no slope-equation oracle supplied".into())
            })?;
            let slopes = oracle.slope_equations(tri).ok_or_else(|| {
                EnumError::InvalidCoordinateSystem("slope equations unavailable".into())
            })?;
            if slopes.cols() != 3 * tri.size() {
                return Err(EnumError::InvalidCoordinateSystem(
                    "oracle returned slope equations of the wrong dimension".into(),
                ));
            }
            let octagons = coords == NormalCoords::AlmostNormalQuadClosed3;
            let block = coords.block_size();
            let mut eqns = quad_equations(tri, block, octagons);
            // Append the oracle's rows verbatim, widened to the block
            // layout: slope equations constrain quadrilaterals only.
            for r in 0..slopes.rows() {
                let mut row = vec![Int::ZERO; block * tri.size()];
                for t in 0..tri.size() {
                    for q in 0..3 {
                        row[block * t + q] = slopes.entry(r, 3 * t + q).clone();
                    }
                }
                eqns.push_row(row);
            }
            Ok(eqns)
        }
        NormalCoords::Std4 => Err(EnumError::InvalidCoordinateSystem(
            "Std4 needs a 4-dimensional triangulation".into(),
        )),
    }
}

fn require_valid(tri: &Triangulation3) -> Result<()> {
    if tri.is_valid() {
        Ok(())
    } else {
        Err(EnumError::PreconditionFailed(
            "quadrilateral coordinates need a valid triangulation".into(),
        ))
    }
}

/// Standard coordinates: one equation per arc type per interior triangle.
///
/// The arc about face vertex `i` meets, within each incident tetrahedron,
/// the triangle at `p[i]`, the quad separating `p[i]` from the opposite
/// vertex `p[3]`, and (in almost normal systems) both octagons meeting
/// edge `p[i]p[3]`.
fn standard_equations(tri: &Triangulation3, block: usize, octagons: bool) -> MatrixInt {
    let mut eqns = MatrixInt::zero(0, block * tri.size());
    for triangle in tri.triangles() {
        if triangle.is_boundary() {
            continue;
        }
        let e0 = &triangle.embeddings[0];
        let e1 = &triangle.embeddings[1];
        for i in 0..3 {
            let mut row = vec![Int::ZERO; block * tri.size()];
            for (emb, sign) in [(e0, 1i64), (e1, -1i64)] {
                let v = emb.perm.image(i);
                let w = emb.perm.image(3);
                let s = Int::from(sign);
                row[block * emb.tet + v].add_assign(&s);
                row[block * emb.tet + 4 + QUAD_SEPARATING[v][w]].add_assign(&s);
                if octagons {
                    for &o in &QUAD_MEETING[v][w] {
                        row[block * emb.tet + 7 + o].add_assign(&s);
                    }
                }
            }
            eqns.push_row(row);
        }
    }
    eqns
}

/// Quadrilateral coordinates: one equation per interior edge.
///
/// Walking around the edge, each embedding contributes +1 for the quad
/// separating `p[0]` from `p[2]` and -1 for the quad separating `p[0]`
/// from `p[3]`; octagon contributions carry the opposite signs since an
/// octagon of type `o` meets the same arcs as the two quads of the other
/// types.
fn quad_equations(tri: &Triangulation3, block: usize, octagons: bool) -> MatrixInt {
    let mut eqns = MatrixInt::zero(0, block * tri.size());
    for edge in tri.edges() {
        if edge.boundary || !edge.valid {
            continue;
        }
        let mut row = vec![Int::ZERO; block * tri.size()];
        for emb in &edge.embeddings {
            let a = QUAD_SEPARATING[emb.perm.image(0)][emb.perm.image(2)];
            let b = QUAD_SEPARATING[emb.perm.image(0)][emb.perm.image(3)];
            row[block * emb.tet + a].add_assign(&Int::ONE);
            row[block * emb.tet + b].sub_assign(&Int::ONE);
            if octagons {
                row[block * emb.tet + 3 + a].sub_assign(&Int::ONE);
                row[block * emb.tet + 3 + b].add_assign(&Int::ONE);
            }
        }
        eqns.push_row(row);
    }
    eqns
}

/// Standard coordinates in dimension 4: one equation per arc type (that
/// is, per vertex) per interior tetrahedron.  The arc about vertex `p[v]`
/// meets the tetrahedron piece at `p[v]` and the prism along the edge
/// from `p[v]` to the opposite vertex `p[4]`.
pub fn matching_equations_dim4(tri: &Triangulation4) -> Result<MatrixInt> {
    use crate::triangulation::dim4::pent_edge_number;

    let mut eqns = MatrixInt::zero(0, 15 * tri.size());
    for tet in tri.tetrahedra() {
        if tet.is_boundary() {
            continue;
        }
        let e0 = &tet.embeddings[0];
        let e1 = &tet.embeddings[1];
        for v in 0..4 {
            let mut row = vec![Int::ZERO; 15 * tri.size()];
            for (emb, sign) in [(e0, 1i64), (e1, -1i64)] {
                let a = emb.perm.image(v);
                let b = emb.perm.image(4);
                let s = Int::from(sign);
                row[15 * emb.pent + a].add_assign(&s);
                row[15 * emb.pent + 5 + pent_edge_number(a, b)].add_assign(&s);
            }
            eqns.push_row(row);
        }
    }
    Ok(eqns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::ValidityConstraints;
    use crate::triangulation::sample;

    fn is_solution(eqns: &MatrixInt, v: &[Int]) -> bool {
        (0..eqns.rows()).all(|r| eqns.row_dot(r, v).is_zero())
    }

    #[test]
    fn test_lst_has_no_equations() {
        let tri = sample::lst123();
        let eqns = matching_equations(&tri, NormalCoords::Quad3, None).unwrap();
        assert_eq!(eqns.rows(), 0);
        assert_eq!(eqns.cols(), 3);
    }

    #[test]
    fn test_one_tet_sphere_quad_equations() {
        let tri = sample::s3_one_tet();
        let eqns = matching_equations(&tri, NormalCoords::Quad3, None).unwrap();
        assert_eq!(eqns.rows(), 3);
        // The cone is spanned by the third quad alone.
        let q2 = [Int::ZERO, Int::ZERO, Int::ONE];
        assert!(is_solution(&eqns, &q2));
        let q0 = [Int::ONE, Int::ZERO, Int::ZERO];
        assert!(!is_solution(&eqns, &q0));
    }

    #[test]
    fn test_figure_eight_quad_equations() {
        let tri = sample::figure_eight();
        let eqns = matching_equations(&tri, NormalCoords::Quad3, None).unwrap();
        assert_eq!(eqns.rows(), 2);
        // One of the known quad vertex surfaces.
        let v: Vec<Int> = [0, 0, 2, 1, 0, 0].iter().map(|&x| Int::from(x)).collect();
        assert!(is_solution(&eqns, &v));
    }

    #[test]
    fn test_standard_equations_have_vertex_links() {
        let tri = sample::figure_eight();
        let eqns = matching_equations(&tri, NormalCoords::Std3, None).unwrap();
        assert_eq!(eqns.rows(), 12);
        // The vertex link (all eight triangle coordinates) is a solution.
        let mut link = vec![Int::ZERO; 14];
        for t in 0..2 {
            for v in 0..4 {
                link[7 * t + v] = Int::ONE;
            }
        }
        assert!(is_solution(&eqns, &link));
    }

    #[test]
    fn test_almost_normal_octagon_solution() {
        // In LST(1,2,3) there are no equations, so any single octagon is
        // admissible and satisfies the (empty) matching system.
        let tri = sample::lst123();
        let eqns = matching_equations(&tri, NormalCoords::AlmostNormalQuad3, None).unwrap();
        assert_eq!(eqns.rows(), 0);
        let c = ValidityConstraints::for_coords(NormalCoords::AlmostNormalQuad3, 1);
        let mut oct = vec![Int::ZERO; 6];
        oct[3] = Int::ONE;
        assert!(c.admissible(&oct));
    }

    #[test]
    fn test_closed_variant_needs_ideal() {
        let tri = sample::s3_one_tet();
        let err = matching_equations(&tri, NormalCoords::QuadClosed3, None).unwrap_err();
        assert!(matches!(err, EnumError::InvalidCoordinateSystem(_)));
    }

    #[test]
    fn test_closed_variant_uses_oracle() {
        struct Fixed;
        impl SlopeOracle for Fixed {
            fn slope_equations(&self, tri: &Triangulation3) -> Option<MatrixInt> {
                let mut m = MatrixInt::zero(2, 3 * tri.size());
                m.set(0, 0, Int::ONE);
                m.set(1, 1, Int::ONE);
                Some(m)
            }
        }
        struct Unavailable;
        impl SlopeOracle for Unavailable {
            fn slope_equations(&self, _: &Triangulation3) -> Option<MatrixInt> {
                None
            }
        }

        let tri = sample::figure_eight();
        let eqns = matching_equations(&tri, NormalCoords::QuadClosed3, Some(&Fixed)).unwrap();
        // Two edge equations plus the two oracle rows.
        assert_eq!(eqns.rows(), 4);
        assert_eq!(eqns.entry(2, 0), &Int::ONE);

        let err =
            matching_equations(&tri, NormalCoords::QuadClosed3, Some(&Unavailable)).unwrap_err();
        assert!(matches!(err, EnumError::InvalidCoordinateSystem(_)));
    }

    #[test]
    fn test_dim4_equations() {
        let tri = sample::s4_doubled();
        let eqns = matching_equations_dim4(&tri).unwrap();
        // Five interior tetrahedra, four arc types each.
        assert_eq!(eqns.rows(), 20);
        assert_eq!(eqns.cols(), 30);
        // The double of any tetrahedron piece together with its mirror
        // is a solution: identical coordinates on both pentachora.
        let mut v = vec![Int::ZERO; 30];
        for i in 0..5 {
            v[i] = Int::ONE;
            v[15 + i] = Int::ONE;
        }
        let ok = (0..eqns.rows()).all(|r| eqns.row_dot(r, &v).is_zero());
        assert!(ok);
    }
}
