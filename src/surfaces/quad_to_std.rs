// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Conversion from quadrilateral to standard coordinate solution sets.
//!
//! The admissible vertex rays in standard coordinates are recovered from
//! the quadrilateral vertex rays without re-running a full enumeration.
//! Each quad ray is first lifted canonically: triangle coordinates are
//! propagated around every vertex link (their pairwise differences are
//! forced by the matching equations) and shifted so the smallest value
//! at each vertex is zero.  The lift may still hide rays that differ by
//! vertex links, so the triangle coordinates are then re-cut one
//! inequality at a time: for every embedding of every vertex, the
//! hyperplane `v[tcoord] >= 0` is incorporated by the same pair-combine
//! step the double description method uses, seeded with the *negated*
//! link of the vertex under consideration so that combinations can trade
//! link copies away.  After each vertex the link itself rejoins the
//! solution set and surviving rays shed as many copies of the later
//! links as possible.
//!
//! Triangle coordinates not yet processed are excluded from the
//! adjacency test via an ignore mask; this stage dominates large
//! standard-coordinate enumerations and is fully generic over the
//! bitmask width.

use crate::bitmask::{with_bitmask_for, Bitmask, WithBitmask};
use crate::coords::{NormalCoords, ValidityConstraints, QUAD_MEETING, QUAD_SEPARATING};
use crate::error::{EnumError, Result};
use crate::maths::{matrix, Int};
use crate::progress::ProgressTracker;
use crate::triangulation::Triangulation3;

/// A ray in standard coordinates together with its zero-set bitmask.
#[derive(Debug, Clone)]
struct RaySpec<B> {
    coords: Vec<Int>,
    /// Bit `i` set exactly when `coords[i]` is zero.
    facets: B,
}

impl<B: Bitmask> RaySpec<B> {
    fn from_vector(v: &[Int]) -> RaySpec<B> {
        let mut facets = B::with_len(v.len());
        for (i, c) in v.iter().enumerate() {
            if c.is_zero() {
                facets.set(i, true);
            }
        }
        RaySpec {
            coords: v.to_vec(),
            facets,
        }
    }

    /// The negative of the given vertex link.
    fn negated_link(tri: &Triangulation3, vertex: usize, block: usize) -> RaySpec<B> {
        let len = block * tri.size();
        let mut coords = vec![Int::ZERO; len];
        let mut facets = B::with_len(len);
        for i in 0..len {
            facets.set(i, true);
        }
        for emb in &tri.vertices()[vertex].embeddings {
            let i = block * emb.tet + emb.vertex;
            let mut v = Int::ONE;
            v.negate();
            coords[i] = v;
            facets.set(i, false);
        }
        RaySpec { coords, facets }
    }

    /// Where the plane through `pos` and `neg` meets the hyperplane on
    /// which coordinate `coord` vanishes, scaled to primitivity.
    fn combine(pos: &RaySpec<B>, neg: &RaySpec<B>, coord: usize) -> RaySpec<B> {
        let pos_diff = pos.coords[coord].clone();
        let neg_diff = neg.coords[coord].clone();

        let len = pos.coords.len();
        let mut coords = Vec::with_capacity(len);
        for i in 0..len {
            let mut a = neg.coords[i].clone();
            a.mul_assign(&pos_diff);
            let mut b = pos.coords[i].clone();
            b.mul_assign(&neg_diff);
            a.sub_assign(&b);
            coords.push(a);
        }
        matrix::scale_down(&mut coords);

        // Cancellations may zero out coordinates that were non-zero in
        // both parents, so the zero set is rebuilt outright.
        let mut facets = B::with_len(len);
        for (i, c) in coords.iter().enumerate() {
            if c.is_zero() {
                facets.set(i, true);
            }
        }
        RaySpec { coords, facets }
    }

    fn sign(&self, i: usize) -> i8 {
        if self.facets.get(i) {
            0
        } else {
            self.coords[i].sign()
        }
    }

    /// Whether this ray vanishes everywhere that both `x` and `y`
    /// vanish, positions in `ignore` excepted.
    fn on_all_common_facets(&self, x: &RaySpec<B>, y: &RaySpec<B>, ignore: &B) -> bool {
        let mut mask = ignore.clone();
        mask.or_assign(&self.facets);
        mask.contains_intn(&x.facets, &y.facets)
    }

    /// Subtract as many copies of the given vertex link as possible
    /// without driving any coordinate negative.
    fn reduce(&mut self, link: &RaySpec<B>) {
        if !link.facets.contains(&self.facets) {
            return;
        }
        let mut max: Option<Int> = None;
        for i in 0..self.coords.len() {
            if !link.facets.get(i) {
                match &max {
                    Some(m) if *m <= self.coords[i] => {}
                    _ => max = Some(self.coords[i].clone()),
                }
            }
        }
        let Some(max) = max else { return };
        for i in 0..self.coords.len() {
            if !link.facets.get(i) {
                self.coords[i].sub_assign(&max);
                if self.coords[i].is_zero() {
                    self.facets.set(i, true);
                }
            }
        }
    }
}

/// Lift a quadrilateral (or quad-octagon) vector into standard
/// (or almost normal standard) coordinates.
///
/// Quadrilateral and octagon coordinates are copied across; triangle
/// coordinates are recovered by walking each vertex link, where the
/// matching equations fix the difference between adjacent corners, and
/// shifting each link so its minimum is zero.
pub fn canonical_lift(tri: &Triangulation3, v: &[Int], octagons: bool) -> Vec<Int> {
    let n = tri.size();
    let (from_block, block) = if octagons { (6, 10) } else { (3, 7) };
    debug_assert_eq!(v.len(), from_block * n);

    let mut out = vec![Int::ZERO; block * n];
    for t in 0..n {
        for q in 0..3 {
            out[block * t + 4 + q] = v[from_block * t + q].clone();
        }
        if octagons {
            for o in 0..3 {
                out[block * t + 7 + o] = v[from_block * t + 3 + o].clone();
            }
        }
    }

    // The arcs cut off corner `a` of the face of the tetrahedron
    // opposite vertex `w`.
    let arc_sum = |t: usize, a: usize, w: usize| -> Int {
        let mut sum = v[from_block * t + QUAD_SEPARATING[a][w]].clone();
        if octagons {
            for &o in &QUAD_MEETING[a][w] {
                sum.add_assign(&v[from_block * t + 3 + o]);
            }
        }
        sum
    };

    for vertex in tri.vertices() {
        let mut value = vec![None::<Int>; vertex.embeddings.len()];
        let slot = |t: usize, vv: usize| {
            vertex
                .embeddings
                .iter()
                .position(|e| e.tet == t && e.vertex == vv)
                .expect("corner belongs to this vertex")
        };

        value[0] = Some(Int::ZERO);
        let mut stack = vec![0usize];
        while let Some(cur) = stack.pop() {
            let emb = vertex.embeddings[cur];
            let cur_val = value[cur].clone().expect("visited corners have values");
            for f in 0..4 {
                if f == emb.vertex {
                    continue;
                }
                let Some((t2, g)) = tri.adjacent(emb.tet, f) else {
                    continue;
                };
                let v2 = g.image(emb.vertex);
                let next = slot(t2, v2);
                if value[next].is_none() {
                    let mut val = cur_val.clone();
                    val.add_assign(&arc_sum(emb.tet, emb.vertex, f));
                    val.sub_assign(&arc_sum(t2, v2, g.image(f)));
                    value[next] = Some(val);
                    stack.push(next);
                }
            }
        }

        let min = value
            .iter()
            .map(|x| x.clone().expect("vertex link is connected"))
            .min()
            .expect("vertex has embeddings");
        for (emb, val) in vertex.embeddings.iter().zip(&value) {
            let mut x = val.clone().expect("vertex link is connected");
            x.sub_assign(&min);
            out[block * emb.tet + emb.vertex] = x;
        }
    }
    out
}

struct ConvertJob<'a> {
    tri: &'a Triangulation3,
    rays: &'a [Vec<Int>],
    octagons: bool,
    tracker: Option<&'a ProgressTracker>,
}

impl<'a> WithBitmask for ConvertJob<'a> {
    type Output = Result<Vec<Vec<Int>>>;

    fn run<B: Bitmask>(self) -> Self::Output {
        let tri = self.tri;
        let n = tri.size();
        let block = if self.octagons { 10 } else { 7 };
        let slen = block * n;
        let llen = tri.vertices().len();

        let std_coords = if self.octagons {
            NormalCoords::AlmostNormalStd3
        } else {
            NormalCoords::Std3
        };
        let constraints = ValidityConstraints::for_coords(std_coords, n);
        let constraint_masks: Vec<B> = constraints.bitmasks(slen);

        // One vertex link per vertex of the triangulation.
        let link_specs: Vec<RaySpec<B>> = (0..llen)
            .map(|vtx| {
                let mut link = vec![Int::ZERO; slen];
                for emb in &tri.vertices()[vtx].embeddings {
                    link[block * emb.tet + emb.vertex] = Int::ONE;
                }
                RaySpec::from_vector(&link)
            })
            .collect();

        let mut list: Vec<RaySpec<B>> = self
            .rays
            .iter()
            .map(|q| RaySpec::from_vector(&canonical_lift(tri, q, self.octagons)))
            .collect();

        // Triangle coordinates are cut one at a time; until a
        // coordinate's inequality has been incorporated it plays no part
        // in the adjacency test.
        let mut ignore_facets = B::with_len(slen);
        for i in 0..slen {
            if i % block < 4 {
                ignore_facets.set(i, true);
            }
        }

        for vtx in 0..llen {
            if let Some(t) = self.tracker {
                if !t.set_percent(100.0 * vtx as f64 / llen as f64) {
                    return Err(EnumError::Cancelled);
                }
            }

            list.push(RaySpec::negated_link(tri, vtx, block));

            let embeddings = tri.vertices()[vtx].embeddings.clone();
            for emb in &embeddings {
                let tcoord = block * emb.tet + emb.vertex;

                let mut next: Vec<RaySpec<B>> = Vec::new();
                let mut pos: Vec<usize> = Vec::new();
                let mut neg: Vec<usize> = Vec::new();
                for (i, ray) in list.iter().enumerate() {
                    match ray.sign(tcoord) {
                        0 => {}
                        s if s > 0 => pos.push(i),
                        _ => neg.push(i),
                    }
                    if ray.sign(tcoord) >= 0 {
                        next.push(ray.clone());
                    }
                }

                'pairs: for &p in &pos {
                    for &q in &neg {
                        // Compatibility: the combined support must meet
                        // every constraint in at most one position.
                        let mut join = list[p].facets.clone();
                        join.and_assign(&list[q].facets);
                        let mut support = join.clone();
                        support.flip();
                        for mask in &constraint_masks {
                            let mut m = support.clone();
                            m.and_assign(mask);
                            if !m.at_most_one_bit() {
                                continue 'pairs;
                            }
                        }

                        // Adjacency: no third ray vanishes on all the
                        // parents' common facets (ignored coords aside).
                        for (i, other) in list.iter().enumerate() {
                            if i != p
                                && i != q
                                && other.on_all_common_facets(&list[p], &list[q], &ignore_facets)
                            {
                                continue 'pairs;
                            }
                        }

                        next.push(RaySpec::combine(&list[p], &list[q], tcoord));
                    }
                }

                ignore_facets.set(tcoord, false);
                list = next;
            }

            // The link itself rejoins the solution set, and surviving
            // rays shed whatever later links they can.
            list.push(link_specs[vtx].clone());
            for ray in list.iter_mut() {
                for link in link_specs.iter().skip(vtx + 1) {
                    ray.reduce(link);
                }
            }
        }

        // Verification pass: everything surviving must be admissible,
        // primitive and a matching-equation solution.
        let eqns = crate::coords::matching::matching_equations(tri, std_coords, None)?;
        let mut out = Vec::with_capacity(list.len());
        for mut ray in list.into_iter().map(|r| r.coords) {
            matrix::scale_down(&mut ray);
            debug_assert!(constraints.admissible(&ray));
            debug_assert!((0..eqns.rows()).all(|r| eqns.row_dot(r, &ray).is_zero()));
            if constraints.admissible(&ray)
                && (0..eqns.rows()).all(|r| eqns.row_dot(r, &ray).is_zero())
            {
                out.push(ray);
            }
        }
        Ok(out)
    }
}

/// Convert the full set of admissible quadrilateral (or quad-octagon)
/// vertex rays into the admissible standard (or almost normal standard)
/// vertex rays.
///
/// The input must be the complete vertex solution set, not a subset;
/// individual rays cannot be converted in isolation.  The triangulation
/// must be valid, non-ideal and non-empty.
pub fn quad_to_std(
    tri: &Triangulation3,
    from: NormalCoords,
    rays: &[Vec<Int>],
    tracker: Option<&ProgressTracker>,
) -> Result<Vec<Vec<Int>>> {
    let octagons = match from {
        NormalCoords::Quad3 => false,
        NormalCoords::AlmostNormalQuad3 => true,
        _ => {
            return Err(EnumError::InvalidCoordinateSystem(
                "conversion starts from quadrilateral coordinates".into(),
            ))
        }
    };
    if !tri.is_valid() || tri.is_ideal() {
        return Err(EnumError::PreconditionFailed(
            "quad-to-standard conversion needs a valid non-ideal triangulation".into(),
        ));
    }
    if tri.is_empty() {
        return Ok(Vec::new());
    }

    let block = if octagons { 10 } else { 7 };
    with_bitmask_for(
        block * tri.size(),
        ConvertJob {
            tri,
            rays,
            octagons,
            tracker,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangulation::sample;

    fn ints(xs: &[i64]) -> Vec<Int> {
        xs.iter().map(|&x| Int::from(x)).collect()
    }

    #[test]
    fn test_canonical_lift_preserves_quads() {
        let tri = sample::s3_one_tet();
        let quad = ints(&[0, 0, 1]);
        let lifted = canonical_lift(&tri, &quad, false);
        assert_eq!(&lifted[4..7], &ints(&[0, 0, 1])[..]);
        // The lift satisfies the standard matching equations.
        let eqns = crate::coords::matching::matching_equations(
            &tri,
            NormalCoords::Std3,
            None,
        )
        .unwrap();
        for r in 0..eqns.rows() {
            assert!(eqns.row_dot(r, &lifted).is_zero());
        }
        // Each vertex link's triangle values include a zero.
        for vtx in tri.vertices() {
            assert!(vtx
                .embeddings
                .iter()
                .any(|e| lifted[7 * e.tet + e.vertex].is_zero()));
        }
    }

    #[test]
    fn test_lift_of_zero_vector_is_zero() {
        let tri = sample::lst123();
        let lifted = canonical_lift(&tri, &ints(&[0, 0, 0]), false);
        assert!(lifted.iter().all(Int::is_zero));
    }

    #[test]
    fn test_conversion_rejects_ideal() {
        let tri = sample::figure_eight();
        let err = quad_to_std(&tri, NormalCoords::Quad3, &[], None).unwrap_err();
        assert!(matches!(err, EnumError::PreconditionFailed(_)));
    }

    #[test]
    fn test_conversion_rejects_standard_input() {
        let tri = sample::lst123();
        let err = quad_to_std(&tri, NormalCoords::Std3, &[], None).unwrap_err();
        assert!(matches!(err, EnumError::InvalidCoordinateSystem(_)));
    }

    #[test]
    fn test_lst_conversion_contains_links_and_discs() {
        // LST(1,2,3): no matching equations, so the quad rays are the
        // three units; the standard vertex rays must include the vertex
        // link and each lifted quad ray.
        let tri = sample::lst123();
        let quads = vec![ints(&[1, 0, 0]), ints(&[0, 1, 0]), ints(&[0, 0, 1])];
        let std = quad_to_std(&tri, NormalCoords::Quad3, &quads, None).unwrap();
        assert!(!std.is_empty());

        let mut link = vec![Int::ZERO; 7];
        for emb in &tri.vertices()[0].embeddings {
            link[7 * emb.tet + emb.vertex] = Int::ONE;
        }
        assert!(std.contains(&link), "vertex link missing: {std:?}");

        // Restricting back to quad coordinates recovers each unit ray.
        for unit in &quads {
            assert!(
                std.iter().any(|s| {
                    let mut back: Vec<Int> = s[4..7].to_vec();
                    matrix::scale_down(&mut back);
                    &back == unit
                }),
                "unit {unit:?} not recovered from {std:?}"
            );
        }
    }
}
