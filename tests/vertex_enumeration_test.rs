// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! End-to-end vertex enumeration on the named small triangulations.

mod common;

use common::{assert_vertex_invariants, ints, values};
use surface_search::coords::NormalCoords;
use surface_search::surfaces::{enumerate_vertex, Algorithm, EnumHints, ListScope};
use surface_search::triangulation::{sample, Triangulation3};

fn enumerate(
    tri: &Triangulation3,
    coords: NormalCoords,
    hints: EnumHints,
) -> surface_search::SurfaceList {
    enumerate_vertex(tri, coords, ListScope::EmbeddedOnly, hints, None, None).unwrap()
}

#[test]
fn test_one_tet_no_equations_gives_unit_rays_in_order() {
    // A single tetrahedron whose quadrilateral system carries no
    // matching equations at all: every quad type is an admissible unit
    // ray, emitted in coordinate order after scale-down.
    let tri = sample::lst123();
    let list = enumerate(&tri, NormalCoords::Quad3, EnumHints::default());
    assert_eq!(
        values(&list),
        vec![ints(&[1, 0, 0]), ints(&[0, 1, 0]), ints(&[0, 0, 1])]
    );
}

#[test]
fn test_one_tet_sphere_quad_rays() {
    // The one-tetrahedron sphere: two of its edges force the first two
    // quad types to agree, so only the third survives as an admissible
    // ray.
    let tri = sample::s3_one_tet();
    let list = enumerate(&tri, NormalCoords::Quad3, EnumHints::default());
    assert_eq!(values(&list), vec![ints(&[0, 0, 1])]);
    assert_vertex_invariants(&tri, NormalCoords::Quad3, &list);
}

#[test]
fn test_figure_eight_has_four_quad_vertex_surfaces() {
    let tri = sample::figure_eight();
    let list = enumerate(&tri, NormalCoords::Quad3, EnumHints::default());
    assert_eq!(list.len(), 4);
    assert_vertex_invariants(&tri, NormalCoords::Quad3, &list);

    let mut rays = values(&list);
    rays.sort();
    assert_eq!(
        rays,
        vec![
            ints(&[0, 0, 2, 1, 0, 0]),
            ints(&[0, 2, 0, 1, 0, 0]),
            ints(&[1, 0, 0, 0, 0, 2]),
            ints(&[1, 0, 0, 0, 2, 0]),
        ]
    );
}

#[test]
fn test_tree_and_dd_agree_across_systems() {
    let tri = sample::figure_eight();
    for coords in [NormalCoords::Quad3, NormalCoords::AlmostNormalQuad3] {
        let tree = enumerate(&tri, coords, EnumHints::default());
        let dd = enumerate(
            &tri,
            coords,
            EnumHints {
                prefer_dd: true,
                ..Default::default()
            },
        );
        assert_eq!(tree.algorithm, Algorithm::TreeDirect);
        assert_eq!(dd.algorithm, Algorithm::DoubleDescriptionDirect);
        let mut a = values(&tree);
        let mut b = values(&dd);
        a.sort();
        b.sort();
        assert_eq!(a, b, "mismatch in {coords:?}");
    }
}

#[test]
fn test_deterministic_output_order() {
    let tri = sample::figure_eight();
    for hints in [
        EnumHints::default(),
        EnumHints {
            prefer_dd: true,
            ..Default::default()
        },
    ] {
        let a = enumerate(&tri, NormalCoords::Quad3, hints);
        let b = enumerate(&tri, NormalCoords::Quad3, hints);
        assert_eq!(values(&a), values(&b));
    }
}

#[test]
fn test_empty_triangulation_reports_success() {
    let tri = Triangulation3::from_gluings(0, &[]).unwrap();
    for coords in [NormalCoords::Quad3, NormalCoords::Std3] {
        let list =
            enumerate_vertex(&tri, coords, ListScope::EmbeddedOnly, EnumHints::default(), None, None)
                .unwrap();
        assert!(list.is_empty());
    }
}

#[test]
fn test_boundary_case_every_admissible_unit_survives() {
    // With no validity constraints (immersed mode) and no equations,
    // enumeration degenerates to the unit basis of the orthant.
    let tri = sample::lst123();
    let list =
        enumerate_vertex(&tri, NormalCoords::Quad3, ListScope::ImmersedSingular,
            EnumHints::default(), None, None)
        .unwrap();
    assert_eq!(
        values(&list),
        vec![ints(&[1, 0, 0]), ints(&[0, 1, 0]), ints(&[0, 0, 1])]
    );
}

#[test]
fn test_ball_standard_vertex_surfaces() {
    // A lone tetrahedron in standard coordinates: no matching
    // equations, so the admissible unit vectors all survive.
    let tri = sample::ball();
    let list = enumerate(&tri, NormalCoords::Std3, EnumHints::default());
    assert_eq!(list.len(), 7);
    assert_vertex_invariants(&tri, NormalCoords::Std3, &list);
}

#[test]
fn test_almost_normal_enumeration_invariants() {
    let tri = sample::figure_eight();
    let list = enumerate(&tri, NormalCoords::AlmostNormalQuad3, EnumHints::default());
    assert!(!list.is_empty());
    assert_vertex_invariants(&tri, NormalCoords::AlmostNormalQuad3, &list);
}
