// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Hilbert basis enumeration back-ends.
//!
//! Four routes to the same answer, with different trade-offs:
//!
//! * [`hilbert_dual`] intersects the non-negative orthant with one
//!   hyperplane at a time, saturating the working basis under sums of
//!   vectors from opposite sides and discarding anything reducible.
//!   This is the Bruns-Ichim refinement of Pottier's algorithm, with
//!   the validity constraints applied during (not after) the run.
//! * [`hilbert_primal`] starts from the admissible extremal rays,
//!   finds the maximal admissible faces they span, and computes an
//!   unconstrained basis on each face; the union, deduplicated, is the
//!   basis of the admissible monoid.  A basis element of a face cannot
//!   reduce across faces, since reduction only shrinks support.
//! * [`hilbert_cd`] is Contejean and Devie's incremental search,
//!   extending candidate vectors a unit at a time while the defect of
//!   the candidate can still shrink.
//! * [`hilbert_full_cone`] delegates to the dual algorithm over the
//!   whole cone; it exists so that callers asking for the full-cone
//!   pipeline get a working fallback.

use log::debug;

use crate::bitmask::Bitmask;
use crate::coords::ValidityConstraints;
use crate::error::{EnumError, Result};
use crate::maths::{matrix, Int, MatrixInt};
use crate::progress::ProgressTracker;

use super::dd::row_order;
use super::max_admissible::max_admissible_faces;

/// A working vector: coordinates, support bitmask, and its dot product
/// with the hyperplane currently being processed.
#[derive(Debug, Clone)]
struct VecSpec<B> {
    coords: Vec<Int>,
    /// Bit `i` set exactly when `coords[i]` is non-zero.
    mask: B,
    hyp: Int,
}

impl<B: Bitmask> VecSpec<B> {
    fn unit(pos: usize, dim: usize) -> VecSpec<B> {
        let mut coords = vec![Int::ZERO; dim];
        coords[pos] = Int::ONE;
        let mut mask = B::with_len(dim);
        mask.set(pos, true);
        VecSpec {
            coords,
            mask,
            hyp: Int::ZERO,
        }
    }

    fn init_hyp(&mut self, subspace: &MatrixInt, row: usize) {
        self.hyp = subspace.row_dot(row, &self.coords);
    }

    /// The sum of a vector on the positive side and one on the negative
    /// side of the current hyperplane.
    fn form_sum(pos: &VecSpec<B>, neg: &VecSpec<B>) -> VecSpec<B> {
        let mut coords = pos.coords.clone();
        for (c, n) in coords.iter_mut().zip(&neg.coords) {
            c.add_assign(n);
        }
        let mut mask = pos.mask.clone();
        mask.or_assign(&neg.mask);
        let mut hyp = pos.hyp.clone();
        hyp.add_assign(&neg.hyp);
        VecSpec { coords, mask, hyp }
    }

    /// Componentwise comparison `self <= other`.
    fn le(&self, other: &VecSpec<B>) -> bool {
        if !other.mask.contains(&self.mask) {
            return false;
        }
        self.coords.iter().zip(&other.coords).all(|(a, b)| a <= b)
    }

    fn admissible(&self, constraint_masks: &[B]) -> bool {
        constraint_masks.iter().all(|c| {
            let mut m = self.mask.clone();
            m.and_assign(c);
            m.at_most_one_bit()
        })
    }
}

/// Whether `vec` reduces against any candidate in `against`.
///
/// `vec` reduces against `b` when `vec - b` is non-negative and lies on
/// the side of the current hyperplane given by `list_sign` (on the
/// hyperplane for zero, weakly positive for positive, weakly negative
/// for negative).  The reduced vector then witnesses that `vec` is not
/// needed in the basis.
fn reduces<B: Bitmask>(vec: &VecSpec<B>, against: &[VecSpec<B>], list_sign: i8) -> bool {
    against.iter().any(|b| {
        if !b.le(vec) {
            return false;
        }
        match list_sign {
            0 => b.hyp == vec.hyp,
            s if s > 0 => b.hyp <= vec.hyp,
            _ => b.hyp >= vec.hyp,
        }
    })
}

/// Remove from `list` every vector reducible against another (distinct)
/// vector of `list`, with `list_sign` as in [`reduces`].
fn reduce_basis<B: Bitmask>(list: &mut Vec<VecSpec<B>>, list_sign: i8) {
    let mut i = 0;
    while i < list.len() {
        let vec = list[i].clone();
        let reducible = list.iter().enumerate().any(|(j, b)| {
            if i == j || !b.le(&vec) {
                return false;
            }
            match list_sign {
                0 => b.hyp == vec.hyp,
                s if s > 0 => b.hyp <= vec.hyp,
                _ => b.hyp >= vec.hyp,
            }
        });
        if reducible {
            list.swap_remove(i);
        } else {
            i += 1;
        }
    }
}

/// Intersect the current basis with one more hyperplane.
fn intersect_hyperplane<B: Bitmask>(
    list: &mut Vec<VecSpec<B>>,
    subspace: &MatrixInt,
    row: usize,
    constraint_masks: &[B],
) {
    for v in list.iter_mut() {
        v.init_hyp(subspace, row);
    }

    let mut zero: Vec<VecSpec<B>> = Vec::new();
    let mut pos: Vec<VecSpec<B>> = Vec::new();
    let mut neg: Vec<VecSpec<B>> = Vec::new();
    for v in list.drain(..) {
        match v.hyp.sign() {
            0 => zero.push(v),
            s if s > 0 => pos.push(v),
            _ => neg.push(v),
        }
    }

    // Saturate under sums of a positive and a negative vector.  Each
    // round only pairs sums where at least one summand is new, so the
    // loop terminates exactly when a full round adds nothing.
    let mut new_pos = 0;
    let mut new_neg = 0;
    loop {
        let pos_len = pos.len();
        let neg_len = neg.len();
        let mut fresh: Vec<VecSpec<B>> = Vec::new();

        for (i, p) in pos.iter().enumerate() {
            for (j, n) in neg.iter().enumerate() {
                if i < new_pos && j < new_neg {
                    continue;
                }
                let s = VecSpec::form_sum(p, n);
                if !s.admissible(constraint_masks) {
                    continue;
                }
                let sign = s.hyp.sign();
                let settled: &[VecSpec<B>] = match sign {
                    0 => &zero,
                    s if s > 0 => &pos,
                    _ => &neg,
                };
                if reduces(&s, &zero, sign)
                    || (sign != 0 && reduces(&s, settled, sign))
                    || reduces(&s, &fresh, sign)
                {
                    continue;
                }
                fresh.push(s);
            }
        }

        new_pos = pos_len;
        new_neg = neg_len;
        if fresh.is_empty() {
            break;
        }
        for s in fresh {
            match s.hyp.sign() {
                0 => zero.push(s),
                sg if sg > 0 => pos.push(s),
                _ => neg.push(s),
            }
        }
    }

    // Only the vectors on the hyperplane survive; make them minimal.
    reduce_basis(&mut zero, 0);
    *list = zero;
}

/// The Hilbert basis of `{v >= 0 : subspace . v = 0}` restricted to the
/// admissible vectors, by the dual (hyperplane-at-a-time) algorithm.
pub fn hilbert_dual<B: Bitmask>(
    subspace: &MatrixInt,
    constraints: &ValidityConstraints,
    tracker: Option<&ProgressTracker>,
    initial_rows: usize,
) -> Result<Vec<Vec<Int>>> {
    let dim = subspace.cols();
    if dim == 0 {
        return Ok(Vec::new());
    }
    let constraint_masks: Vec<B> = constraints.bitmasks(dim);

    let mut list: Vec<VecSpec<B>> = (0..dim).map(|i| VecSpec::unit(i, dim)).collect();
    let order = row_order(subspace, initial_rows);
    let n_rows = order.len();

    for (step, &row) in order.iter().enumerate() {
        if let Some(t) = tracker {
            if !t.set_percent(100.0 * step as f64 / n_rows.max(1) as f64) {
                return Err(EnumError::Cancelled);
            }
        }
        intersect_hyperplane(&mut list, subspace, row, &constraint_masks);
        debug!("hilbert dual: {} vectors after {} hyperplanes", list.len(), step + 1);
    }

    let mut out: Vec<Vec<Int>> = list.into_iter().map(|v| v.coords).collect();
    out.sort();
    Ok(out)
}

/// The Hilbert basis of the admissible monoid by the primal route:
/// admissible extremal rays in, maximal admissible faces, one
/// unconstrained basis per face.
pub fn hilbert_primal<B: Bitmask>(
    rays: &[Vec<Int>],
    subspace: &MatrixInt,
    constraints: &ValidityConstraints,
    tracker: Option<&ProgressTracker>,
) -> Result<Vec<Vec<Int>>> {
    let dim = subspace.cols();
    if rays.is_empty() {
        return Ok(Vec::new());
    }

    let faces: Vec<B> = max_admissible_faces(rays, dim, constraints);
    debug!("hilbert primal: {} maximal admissible faces", faces.len());

    let mut out: Vec<Vec<Int>> = Vec::new();
    let n_faces = faces.len();
    for (step, face) in faces.iter().enumerate() {
        if let Some(t) = tracker {
            if !t.set_percent(100.0 * step as f64 / n_faces.max(1) as f64) {
                return Err(EnumError::Cancelled);
            }
        }

        // Restrict the system to the face's support coordinates; within
        // a face there are no constraints left to impose.
        let support: Vec<usize> = (0..dim).filter(|&i| face.get(i)).collect();
        let mut sub = MatrixInt::zero(subspace.rows(), support.len());
        for r in 0..subspace.rows() {
            for (c, &orig) in support.iter().enumerate() {
                sub.set(r, c, subspace.entry(r, orig).clone());
            }
        }

        let basis = hilbert_dual::<B>(&sub, &ValidityConstraints::none(), None, 0)?;
        for small in basis {
            let mut full = vec![Int::ZERO; dim];
            for (c, &orig) in support.iter().enumerate() {
                full[orig] = small[c].clone();
            }
            if !out.contains(&full) {
                out.push(full);
            }
        }
    }
    out.sort();
    Ok(out)
}

/// The Hilbert basis by Contejean and Devie's incremental algorithm.
///
/// Candidates grow one unit vector at a time; a coordinate may only be
/// incremented when doing so moves the defect `M v` towards zero
/// (negative inner product with that coordinate's column image).
pub fn hilbert_cd<B: Bitmask>(
    subspace: &MatrixInt,
    constraints: &ValidityConstraints,
    tracker: Option<&ProgressTracker>,
) -> Result<Vec<Vec<Int>>> {
    let dim = subspace.cols();
    if dim == 0 {
        return Ok(Vec::new());
    }
    let constraint_masks: Vec<B> = constraints.bitmasks(dim);
    let rows = subspace.rows();

    // The image of each unit vector under the matrix.
    let columns: Vec<Vec<Int>> = (0..dim)
        .map(|c| (0..rows).map(|r| subspace.entry(r, c).clone()).collect())
        .collect();
    let image = |v: &[Int]| -> Vec<Int> {
        (0..rows).map(|r| subspace.row_dot(r, v)).collect()
    };

    let mut basis: Vec<VecSpec<B>> = Vec::new();
    let mut frontier: Vec<VecSpec<B>> = (0..dim)
        .map(|i| VecSpec::unit(i, dim))
        .filter(|v| v.admissible(&constraint_masks))
        .collect();

    while !frontier.is_empty() {
        if let Some(t) = tracker {
            if t.is_cancelled() {
                return Err(EnumError::Cancelled);
            }
        }

        let mut next: Vec<VecSpec<B>> = Vec::new();
        for v in &frontier {
            let defect = image(&v.coords);
            if defect.iter().all(Int::is_zero) {
                if !basis.iter().any(|b| b.le(v)) {
                    basis.push(v.clone());
                }
                continue;
            }
            for (i, col) in columns.iter().enumerate() {
                if matrix::dot(&defect, col).sign() >= 0 {
                    continue;
                }
                let mut w = v.clone();
                w.coords[i].add_assign(&Int::ONE);
                w.mask.set(i, true);
                if !w.admissible(&constraint_masks) {
                    continue;
                }
                if basis.iter().any(|b| b.le(&w)) {
                    continue;
                }
                if next.iter().any(|n| n.coords == w.coords) {
                    continue;
                }
                next.push(w);
            }
        }
        frontier = next;
        debug!(
            "hilbert cd: frontier {}, basis {}",
            frontier.len(),
            basis.len()
        );
    }

    // Solutions found along different paths may still reduce against
    // each other.
    let mut basis_vectors = basis;
    for v in basis_vectors.iter_mut() {
        v.hyp = Int::ZERO;
    }
    reduce_basis(&mut basis_vectors, 0);

    let mut out: Vec<Vec<Int>> = basis_vectors.into_iter().map(|v| v.coords).collect();
    out.sort();
    Ok(out)
}

/// The full-cone pipeline.
///
/// Without an external lattice-point library this reduces to the dual
/// algorithm over the whole system, constraints included.
pub fn hilbert_full_cone<B: Bitmask>(
    subspace: &MatrixInt,
    constraints: &ValidityConstraints,
    tracker: Option<&ProgressTracker>,
) -> Result<Vec<Vec<Int>>> {
    debug!("hilbert full-cone: delegating to the dual algorithm");
    hilbert_dual::<B>(subspace, constraints, tracker, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmask::Bitmask64;
    use crate::coords::{matching, NormalCoords};
    use crate::enumerate::dd::enumerate_extremal_rays;
    use crate::triangulation::sample;

    fn ints(xs: &[i64]) -> Vec<Int> {
        xs.iter().map(|&x| Int::from(x)).collect()
    }

    fn quad_system(
        tri: &crate::triangulation::Triangulation3,
    ) -> (MatrixInt, ValidityConstraints) {
        let eqns = matching::matching_equations(tri, NormalCoords::Quad3, None).unwrap();
        let cons = ValidityConstraints::for_coords(NormalCoords::Quad3, tri.size());
        (eqns, cons)
    }

    fn assert_is_basis(
        basis: &[Vec<Int>],
        eqns: &MatrixInt,
        cons: &ValidityConstraints,
    ) {
        assert!(!basis.is_empty());
        for v in basis {
            for r in 0..eqns.rows() {
                assert!(eqns.row_dot(r, v).is_zero(), "not a solution: {v:?}");
            }
            assert!(cons.admissible(v), "not admissible: {v:?}");
            // Minimality: no other basis element is componentwise <= v.
            for w in basis {
                if w != v {
                    assert!(
                        w.iter().zip(v).any(|(a, b)| a > b),
                        "{w:?} reduces {v:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_dual_no_equations() {
        let tri = sample::lst123();
        let (eqns, cons) = quad_system(&tri);
        let basis = hilbert_dual::<Bitmask64>(&eqns, &cons, None, 0).unwrap();
        assert_eq!(
            basis,
            vec![ints(&[0, 0, 1]), ints(&[0, 1, 0]), ints(&[1, 0, 0])]
        );
    }

    #[test]
    fn test_dual_one_tet_sphere() {
        let tri = sample::s3_one_tet();
        let (eqns, cons) = quad_system(&tri);
        let basis = hilbert_dual::<Bitmask64>(&eqns, &cons, None, 0).unwrap();
        assert_eq!(basis, vec![ints(&[0, 0, 1])]);
    }

    #[test]
    fn test_dual_figure_eight_contains_rays() {
        let tri = sample::figure_eight();
        let (eqns, cons) = quad_system(&tri);
        let basis = hilbert_dual::<Bitmask64>(&eqns, &cons, None, 0).unwrap();
        assert_is_basis(&basis, &eqns, &cons);
        // Every primitive extremal ray is a Hilbert basis element.
        let rays = enumerate_extremal_rays::<Bitmask64>(&eqns, &cons, None, 0).unwrap();
        for r in &rays {
            assert!(basis.contains(r), "missing ray {r:?}");
        }
    }

    #[test]
    fn test_primal_agrees_with_dual() {
        let tri = sample::figure_eight();
        let (eqns, cons) = quad_system(&tri);
        let rays = enumerate_extremal_rays::<Bitmask64>(&eqns, &cons, None, 0).unwrap();
        let primal = hilbert_primal::<Bitmask64>(&rays, &eqns, &cons, None).unwrap();
        let dual = hilbert_dual::<Bitmask64>(&eqns, &cons, None, 0).unwrap();
        assert_eq!(primal, dual);
    }

    #[test]
    fn test_cd_agrees_with_dual() {
        let tri = sample::s3_one_tet();
        let (eqns, cons) = quad_system(&tri);
        let cd = hilbert_cd::<Bitmask64>(&eqns, &cons, None).unwrap();
        let dual = hilbert_dual::<Bitmask64>(&eqns, &cons, None, 0).unwrap();
        assert_eq!(cd, dual);
    }

    #[test]
    fn test_full_cone_delegates() {
        let tri = sample::s3_one_tet();
        let (eqns, cons) = quad_system(&tri);
        assert_eq!(
            hilbert_full_cone::<Bitmask64>(&eqns, &cons, None).unwrap(),
            hilbert_dual::<Bitmask64>(&eqns, &cons, None, 0).unwrap()
        );
    }

    #[test]
    fn test_unconstrained_basis_figure_eight() {
        let tri = sample::figure_eight();
        let (eqns, _) = quad_system(&tri);
        let none = ValidityConstraints::none();
        let basis = hilbert_dual::<Bitmask64>(&eqns, &none, None, 0).unwrap();
        assert_is_basis(&basis, &eqns, &none);
    }

    #[test]
    fn test_cancellation() {
        let tri = sample::figure_eight();
        let (eqns, cons) = quad_system(&tri);
        let tracker = ProgressTracker::new();
        tracker.cancel();
        assert_eq!(
            hilbert_dual::<Bitmask64>(&eqns, &cons, Some(&tracker), 0).unwrap_err(),
            EnumError::Cancelled
        );
    }
}
