// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The reduced-to-standard pipeline against direct enumeration.

mod common;

use common::{assert_vertex_invariants, values};
use surface_search::coords::NormalCoords;
use surface_search::maths::{matrix, Int};
use surface_search::surfaces::{enumerate_vertex, Algorithm, EnumHints, ListScope};
use surface_search::triangulation::{sample, Triangulation3};

fn vertex(
    tri: &Triangulation3,
    coords: NormalCoords,
    hints: EnumHints,
) -> surface_search::SurfaceList {
    enumerate_vertex(tri, coords, ListScope::EmbeddedOnly, hints, None, None).unwrap()
}

/// The standard vector restricted to its quadrilateral block, primitive.
fn quad_projection(std: &[Int], block: usize, n: usize) -> Vec<Int> {
    let mut out = Vec::with_capacity(3 * n);
    for t in 0..n {
        for q in 0..3 {
            out.push(std[block * t + 4 + q].clone());
        }
    }
    matrix::scale_down(&mut out);
    out
}

#[test]
fn test_lst_via_reduced_matches_direct() {
    let tri = sample::lst123();

    let via = vertex(&tri, NormalCoords::Std3, EnumHints::default());
    assert_eq!(via.algorithm, Algorithm::ViaReduced);
    assert_vertex_invariants(&tri, NormalCoords::Std3, &via);

    let direct = vertex(
        &tri,
        NormalCoords::Std3,
        EnumHints {
            prefer_direct: true,
            ..Default::default()
        },
    );
    assert_ne!(direct.algorithm, Algorithm::ViaReduced);
    assert_vertex_invariants(&tri, NormalCoords::Std3, &direct);

    assert_eq!(via.len(), direct.len());
    let mut a = values(&via);
    let mut b = values(&direct);
    a.sort();
    b.sort();
    assert_eq!(a, b);
}

#[test]
fn test_lst_projections_are_quad_rays_or_links() {
    let tri = sample::lst123();
    let quad = vertex(&tri, NormalCoords::Quad3, EnumHints::default());
    let quad_rays = values(&quad);

    let std = vertex(&tri, NormalCoords::Std3, EnumHints::default());
    for s in values(&std) {
        let p = quad_projection(&s, 7, tri.size());
        if p.iter().all(Int::is_zero) {
            // Vertex links are the only rays with no quadrilaterals.
            continue;
        }
        assert!(quad_rays.contains(&p), "projection {p:?} is not a quad ray");
    }
}

#[test]
fn test_quad_std_quad_round_trip() {
    // Enumerate in quad coordinates, expand to standard, restrict back:
    // the quad solution set must reappear exactly.
    for tri in [sample::lst123(), sample::s3_one_tet(), sample::snapped_ball_chain()] {
        let quad = vertex(&tri, NormalCoords::Quad3, EnumHints::default());
        let mut expect = values(&quad);
        expect.sort();
        expect.dedup();

        let std = vertex(&tri, NormalCoords::Std3, EnumHints::default());
        let mut back: Vec<Vec<Int>> = values(&std)
            .iter()
            .map(|s| quad_projection(s, 7, tri.size()))
            .filter(|p| p.iter().any(|x| !x.is_zero()))
            .collect();
        back.sort();
        back.dedup();

        assert_eq!(back, expect, "round trip failed for {} tets", tri.size());
    }
}

#[test]
fn test_closed_manifold_standard_invariants() {
    // Any closed orientable manifold in standard coordinates: finitely
    // many vertex surfaces, each satisfying all four invariants.
    let tri = sample::s3_one_tet();
    let list = vertex(&tri, NormalCoords::Std3, EnumHints::default());
    assert!(!list.is_empty());
    assert_vertex_invariants(&tri, NormalCoords::Std3, &list);

    // Both vertex links appear.
    for vtx in tri.vertices() {
        let mut link = vec![Int::ZERO; 7 * tri.size()];
        for emb in &vtx.embeddings {
            link[7 * emb.tet + emb.vertex] = Int::ONE;
        }
        assert!(values(&list).contains(&link), "missing link {link:?}");
    }
}
