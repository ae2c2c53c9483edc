// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.
#![allow(dead_code)]

use surface_search::coords::matching::matching_equations;
use surface_search::coords::{NormalCoords, ValidityConstraints};
use surface_search::maths::Int;
use surface_search::surfaces::SurfaceList;
use surface_search::triangulation::Triangulation3;

pub fn ints(xs: &[i64]) -> Vec<Int> {
    xs.iter().map(|&x| Int::from(x)).collect()
}

pub fn values(list: &SurfaceList) -> Vec<Vec<Int>> {
    list.surfaces.iter().map(|s| s.values.clone()).collect()
}

/// The gcd of a vector's entries.
pub fn gcd_of(v: &[Int]) -> Int {
    let mut g = Int::ZERO;
    for x in v {
        g.gcd_assign(x);
    }
    g
}

/// Assert the four vertex-list invariants: matching, admissibility,
/// primitivity, and extremality via zero-support comparison.
pub fn assert_vertex_invariants(tri: &Triangulation3, coords: NormalCoords, list: &SurfaceList) {
    let eqns = matching_equations(tri, coords, None).unwrap();
    let cons = ValidityConstraints::for_coords(coords, tri.size());
    let all = values(list);

    for v in &all {
        assert!(v.iter().any(|x| !x.is_zero()), "zero vector emitted");

        // (1) Matching equations.
        for r in 0..eqns.rows() {
            assert!(eqns.row_dot(r, v).is_zero(), "M.v != 0 for {v:?}");
        }

        // (2) Admissibility.
        assert!(cons.admissible(v), "inadmissible vector {v:?}");

        // (3) Primitivity.
        assert!(gcd_of(v).is_one(), "non-primitive vector {v:?}");

        // (4) Extremality: no other ray's zero support strictly
        // contains this ray's zero support.
        for w in &all {
            if w == v {
                continue;
            }
            let contained = v
                .iter()
                .zip(w)
                .all(|(a, b)| !a.is_zero() || b.is_zero());
            assert!(!contained, "{v:?} is not extreme (see {w:?})");
        }
    }
}
