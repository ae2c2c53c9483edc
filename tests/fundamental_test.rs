// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Fundamental (Hilbert basis) enumeration across the four back-ends.

mod common;

use common::{gcd_of, values};
use surface_search::coords::matching::matching_equations;
use surface_search::coords::{NormalCoords, ValidityConstraints};
use surface_search::surfaces::{
    enumerate_fundamental, enumerate_vertex, EnumHints, HilbertBackend, ListScope,
};
use surface_search::triangulation::{sample, Triangulation3};

fn fundamental(
    tri: &Triangulation3,
    coords: NormalCoords,
    scope: ListScope,
    backend: Option<HilbertBackend>,
) -> surface_search::SurfaceList {
    enumerate_fundamental(
        tri,
        coords,
        scope,
        EnumHints {
            hilbert: backend,
            ..Default::default()
        },
        None,
        None,
    )
    .unwrap()
}

#[test]
fn test_backends_agree_on_figure_eight() {
    let tri = sample::figure_eight();
    let mut results = Vec::new();
    for backend in [
        HilbertBackend::Primal,
        HilbertBackend::Dual,
        HilbertBackend::ContejeanDevie,
        HilbertBackend::FullCone,
    ] {
        let list = fundamental(&tri, NormalCoords::Quad3, ListScope::EmbeddedOnly, Some(backend));
        let mut v = values(&list);
        v.sort();
        results.push((backend, v));
    }
    for (backend, v) in &results[1..] {
        assert_eq!(v, &results[0].1, "{backend:?} disagrees");
    }
}

#[test]
fn test_basis_contains_vertex_rays() {
    let tri = sample::figure_eight();
    let basis = values(&fundamental(
        &tri,
        NormalCoords::Quad3,
        ListScope::EmbeddedOnly,
        None,
    ));
    let rays = values(
        &enumerate_vertex(
            &tri,
            NormalCoords::Quad3,
            ListScope::EmbeddedOnly,
            EnumHints::default(),
            None,
            None,
        )
        .unwrap(),
    );
    for r in &rays {
        assert!(basis.contains(r), "vertex ray {r:?} missing from basis");
    }
}

#[test]
fn test_basis_elements_are_irreducible_solutions() {
    let tri = sample::figure_eight();
    let coords = NormalCoords::Quad3;
    let basis = values(&fundamental(&tri, coords, ListScope::EmbeddedOnly, None));
    assert!(!basis.is_empty());

    let eqns = matching_equations(&tri, coords, None).unwrap();
    let cons = ValidityConstraints::for_coords(coords, tri.size());
    for v in &basis {
        for r in 0..eqns.rows() {
            assert!(eqns.row_dot(r, v).is_zero());
        }
        assert!(cons.admissible(v));
        assert!(gcd_of(v).is_one());
        for w in &basis {
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
fn test_immersed_basis_defaults_to_dual() {
    let tri = sample::s3_one_tet();
    let list = fundamental(&tri, NormalCoords::Quad3, ListScope::ImmersedSingular, None);
    assert_eq!(
        list.algorithm,
        surface_search::surfaces::Algorithm::HilbertDual
    );
    // Without admissibility constraints more generators can appear.
    assert!(!list.is_empty());
    let eqns = matching_equations(&tri, NormalCoords::Quad3, None).unwrap();
    for v in values(&list) {
        for r in 0..eqns.rows() {
            assert!(eqns.row_dot(r, &v).is_zero());
        }
    }
}

#[test]
fn test_empty_triangulation_fundamental() {
    let tri = Triangulation3::from_gluings(0, &[]).unwrap();
    let list = fundamental(&tri, NormalCoords::Quad3, ListScope::EmbeddedOnly, None);
    assert!(list.is_empty());
}
