// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Triangulations: the external collaborator the engine enumerates over.
//!
//! The enumeration engine only reads triangulations, and only through the
//! narrow interface here: simplex counts, facet gluings, and the derived
//! skeleta (triangles, edges, vertices in dimension 3; tetrahedra in
//! dimension 4) with stable indices and ordered embedding lists.

pub mod dim3;
pub mod dim4;
pub mod sample;

pub use dim3::{Edge, EdgeEmbedding, Triangle, TriangleEmbedding, Triangulation3, Vertex,
    VertexEmbedding};
pub use dim4::{TetrahedronEmbedding, TetrahedronFace, Triangulation4};
