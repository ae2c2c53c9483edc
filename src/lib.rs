// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Enumeration of normal and almost normal surfaces in triangulated
//! 3- and 4-manifolds.
//!
//! A normal surface intersects every tetrahedron of a triangulation in
//! triangles and quadrilaterals (plus, in the almost normal case, at
//! most one octagon anywhere).  Such a surface is encoded as a
//! non-negative integer vector counting disc types per simplex; the
//! vectors that arise are exactly the admissible integer points of a
//! rational polyhedral cone cut out by *matching equations* (adjacent
//! simplices agree on arcs across shared faces) and *validity
//! constraints* (at most one quadrilateral type per tetrahedron, at
//! most one octagon globally).
//!
//! # Architecture
//!
//! The crate is a pipeline from triangulations to lists of primitive
//! integer vectors:
//!
//! * [`triangulation`] holds the input: simplices, gluings, and the
//!   derived skeleton (faces, edges, vertices with classified links).
//!   The engine only ever reads it.
//! * [`coords`] is the coordinate-system registry: per-system vector
//!   layout, matching-equation builders, validity constraints.
//! * [`maths`] supplies exact arithmetic: tagged arbitrary-precision
//!   integers, rationals, dense integer matrices, packed permutations.
//! * [`bitmask`] provides the fixed- and variable-width bitsets that
//!   carry zero-sets, supports and constraint tests through all of the
//!   enumeration algorithms; widths are chosen at run time.
//! * [`enumerate`] contains the engine: the double description method,
//!   the LP-driven backtracking tree traversal, and the Hilbert basis
//!   back-ends.
//! * [`surfaces`] exposes the public entry points
//!   ([`enumerate_vertex`], [`enumerate_fundamental`], [`find_single`])
//!   together with the quad-to-standard conversion and the persisted
//!   surface representation.
//!
//! # Exactness
//!
//! No floating point is used anywhere on the enumeration path.  The LP
//! tableau and tree search run at the narrowest integer width that a
//! Hadamard-style bound proves safe (64-bit, 128-bit, or arbitrary
//! precision), and a native-width overflow is caught internally and the
//! search retried one width up.
//!
//! # Example
//!
//! ```
//! use surface_search::coords::NormalCoords;
//! use surface_search::surfaces::{enumerate_vertex, EnumHints, ListScope};
//! use surface_search::triangulation::sample;
//!
//! let tri = sample::figure_eight();
//! let list = enumerate_vertex(
//!     &tri,
//!     NormalCoords::Quad3,
//!     ListScope::EmbeddedOnly,
//!     EnumHints::default(),
//!     None,
//!     None,
//! )
//! .unwrap();
//! assert_eq!(list.len(), 4);
//! ```

pub mod bitmask;
pub mod coords;
pub mod enumerate;
pub mod error;
pub mod maths;
pub mod progress;
pub mod surfaces;
pub mod triangulation;

pub use coords::NormalCoords;
pub use error::{EnumError, Result};
pub use progress::ProgressTracker;
pub use surfaces::{
    enumerate_fundamental, enumerate_vertex, enumerate_vertex_dim4, find_single, EnumHints,
    ListKind, ListScope, SurfaceList, SurfaceVector,
};
