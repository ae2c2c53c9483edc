// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Ready-made triangulations used in tests and documentation.
//!
//! Gluing tables for the named census triangulations; every construction
//! here is checked against its known skeleton in the test suites.

use super::dim3::Triangulation3;
use super::dim4::Triangulation4;

/// A single tetrahedron with no gluings: the 3-ball.
pub fn ball() -> Triangulation3 {
    Triangulation3::from_gluings(1, &[]).expect("static gluing table")
}

/// The one-tetrahedron layered solid torus LST(1,2,3).
///
/// Face 0 is folded onto face 1; all three edges stay on the boundary,
/// so this triangulation has no matching equations at all.
pub fn lst123() -> Triangulation3 {
    Triangulation3::from_gluings(1, &[(0, 0, 0, [1, 2, 3, 0])]).expect("static gluing table")
}

/// A one-tetrahedron 3-sphere: faces 0/3 and 1/2 identified in pairs.
///
/// Two vertices, three edges (degrees 1, 1 and 4), orientable, closed,
/// trivial fundamental group.
pub fn s3_one_tet() -> Triangulation3 {
    Triangulation3::from_gluings(1, &[(0, 0, 0, [3, 1, 2, 0]), (0, 1, 0, [0, 2, 1, 3])])
        .expect("static gluing table")
}

/// The figure-eight knot complement: two ideal tetrahedra.
///
/// The classical two-tetrahedron gluing; one ideal vertex with torus
/// link, two edges of degree six.
pub fn figure_eight() -> Triangulation3 {
    Triangulation3::from_gluings(
        2,
        &[
            (0, 0, 1, [1, 3, 0, 2]),
            (0, 1, 1, [2, 0, 3, 1]),
            (0, 2, 1, [0, 3, 2, 1]),
            (0, 3, 1, [2, 1, 0, 3]),
        ],
    )
    .expect("static gluing table")
}

/// A three-tetrahedron ball made of three snapped balls glued in a chain.
pub fn snapped_ball_chain() -> Triangulation3 {
    Triangulation3::from_gluings(
        3,
        &[
            (0, 2, 0, [0, 1, 3, 2]),
            (1, 2, 1, [0, 1, 3, 2]),
            (2, 2, 2, [0, 2, 1, 3]),
            (0, 1, 1, [0, 1, 2, 3]),
            (1, 0, 2, [0, 1, 2, 3]),
        ],
    )
    .expect("static gluing table")
}

/// A single pentachoron with no gluings.
pub fn pentachoron() -> Triangulation4 {
    Triangulation4::from_gluings(1, &[]).expect("static gluing table")
}

/// The double of a 4-simplex: two pentachora glued along all five facets
/// by the identity, a triangulated 4-sphere.
pub fn s4_doubled() -> Triangulation4 {
    let gluings: Vec<(usize, usize, usize, [u8; 5])> =
        (0..5).map(|f| (0, f, 1, [0, 1, 2, 3, 4])).collect();
    Triangulation4::from_gluings(2, &gluings).expect("static gluing table")
}
