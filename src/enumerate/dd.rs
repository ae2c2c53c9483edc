// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The double description method for extremal ray enumeration.
//!
//! Computes the extremal rays of the intersection of the non-negative
//! orthant with a linear subspace, keeping only rays whose relative
//! interior satisfies the validity constraints.  The subspace arrives as
//! a matrix of hyperplanes which are intersected one at a time; between
//! iterations the working set holds the extremal rays of the partial
//! intersection.
//!
//! Rays carry their coordinates together with a bitmask of zero
//! positions.  Both the admissibility filter and the adjacency test run
//! entirely on bitmasks: two rays are adjacent when no third ray's zero
//! set contains the intersection of theirs, and a combination is
//! admissible when its support meets every constraint in at most one
//! position.  Invalidity survives conic combination, which is what makes
//! filtering during (rather than after) the run sound.

use crate::bitmask::Bitmask;
use crate::coords::ValidityConstraints;
use crate::error::{EnumError, Result};
use crate::maths::{matrix, Int, MatrixInt};
use crate::progress::ProgressTracker;

/// A ray of the current partial solution cone.
#[derive(Debug, Clone)]
struct RaySpec<B> {
    coords: Vec<Int>,
    /// Bit `i` set exactly when `coords[i]` is zero.
    zeros: B,
}

impl<B: Bitmask> RaySpec<B> {
    fn unit(axis: usize, dim: usize) -> Self {
        let mut coords = vec![Int::ZERO; dim];
        coords[axis] = Int::ONE;
        let mut zeros = B::with_len(dim);
        for i in 0..dim {
            zeros.set(i, i != axis);
        }
        RaySpec { coords, zeros }
    }

    /// The ray where the plane through `pos` and `neg` meets the
    /// hyperplane `h`, scaled to primitivity.
    ///
    /// `dp` and `dn` are the dot products of `h` with `pos` and `neg`;
    /// `dp > 0 > dn`, so the combination below has non-negative entries.
    fn combine(pos: &RaySpec<B>, neg: &RaySpec<B>, dp: &Int, dn: &Int) -> Self {
        let dim = pos.coords.len();
        let mut coords = Vec::with_capacity(dim);
        for i in 0..dim {
            // neg[i] * dp - pos[i] * dn
            let mut a = neg.coords[i].clone();
            a.mul_assign(dp);
            let mut b = pos.coords[i].clone();
            b.mul_assign(dn);
            a.sub_assign(&b);
            coords.push(a);
        }
        matrix::scale_down(&mut coords);
        let mut zeros = B::with_len(dim);
        for (i, c) in coords.iter().enumerate() {
            zeros.set(i, c.is_zero());
        }
        RaySpec { coords, zeros }
    }
}

/// Order hyperplane rows for processing: the first `initial_rows` stay
/// in place, the remainder are sorted by increasing number of non-zero
/// entries.  Fewer touched coordinates early keeps the intermediate ray
/// sets small.
pub(crate) fn row_order(subspace: &MatrixInt, initial_rows: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..subspace.rows()).collect();
    let weight = |r: usize| {
        (0..subspace.cols())
            .filter(|&c| !subspace.entry(r, c).is_zero())
            .count()
    };
    order[initial_rows..].sort_by_key(|&r| weight(r));
    order
}

/// Enumerate the admissible extremal rays of
/// `{v >= 0 : subspace . v = 0}`, primitive and in deterministic order.
///
/// The tracker, if supplied, is polled once per hyperplane; on
/// cancellation the run unwinds with `EnumError::Cancelled` and no rays
/// are reported.
pub fn enumerate_extremal_rays<B: Bitmask>(
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

    // The positive orthant: one ray per coordinate axis.  Unit rays
    // satisfy every constraint outright.
    let mut rays: Vec<RaySpec<B>> = (0..dim).map(|i| RaySpec::unit(i, dim)).collect();

    let order = row_order(subspace, initial_rows);
    let n_rows = order.len();

    for (step, &row) in order.iter().enumerate() {
        if let Some(t) = tracker {
            if !t.set_percent(100.0 * step as f64 / n_rows.max(1) as f64) {
                return Err(EnumError::Cancelled);
            }
        }

        let hyperplane: &[Int] = subspace.row(row);
        let dots: Vec<Int> = rays
            .iter()
            .map(|r| matrix::dot(hyperplane, &r.coords))
            .collect();

        let mut next: Vec<RaySpec<B>> = Vec::new();
        let mut pos: Vec<usize> = Vec::new();
        let mut neg: Vec<usize> = Vec::new();
        for (i, d) in dots.iter().enumerate() {
            match d.sign() {
                0 => next.push(rays[i].clone()),
                s if s > 0 => pos.push(i),
                _ => neg.push(i),
            }
        }

        'pairs: for &p in &pos {
            for &q in &neg {
                // Admissibility first: the combination's support is the
                // union of the two supports, so check the complement of
                // the common zero set against each constraint.
                let mut join = rays[p].zeros.clone();
                join.and_assign(&rays[q].zeros);
                let mut support = join.clone();
                support.flip();
                let mut broken = false;
                for mask in &constraint_masks {
                    let mut m = support.clone();
                    m.and_assign(mask);
                    if !m.at_most_one_bit() {
                        broken = true;
                        break;
                    }
                }
                if broken {
                    continue;
                }

                // Adjacency: no third ray may vanish everywhere that
                // both parents vanish.
                for (i, other) in rays.iter().enumerate() {
                    if i != p && i != q && other.zeros.contains(&join) {
                        continue 'pairs;
                    }
                }

                next.push(RaySpec::combine(&rays[p], &rays[q], &dots[p], &dots[q]));
            }
        }
        rays = next;
    }

    // The initial unit rays are admissible by construction and every kept
    // combination was tested, so the survivors only need unwrapping.
    Ok(rays.into_iter().map(|r| r.coords).collect())
}
