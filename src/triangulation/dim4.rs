// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Four-dimensional triangulations, reduced to what the engine needs.
//!
//! For normal hypersurfaces in standard coordinates the matching
//! equations live on the interior tetrahedra (the codimension-1 faces of
//! the pentachora), so that is all the skeleton we derive here.

use smallvec::SmallVec;

use crate::error::{EnumError, Result};
use crate::maths::perm::{Perm5, PermTables};

/// The ten edges of a pentachoron, by endpoint pair, in lexicographic order.
pub const PENT_EDGE_VERTICES: [(usize, usize); 10] = [
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 4),
    (1, 2),
    (1, 3),
    (1, 4),
    (2, 3),
    (2, 4),
    (3, 4),
];

/// The edge number of the pentachoron edge with the given endpoints.
pub fn pent_edge_number(a: usize, b: usize) -> usize {
    let (a, b) = if a < b { (a, b) } else { (b, a) };
    PENT_EDGE_VERTICES
        .iter()
        .position(|&(x, y)| (x, y) == (a, b))
        .expect("distinct vertices in 0..5")
}

#[derive(Debug, Clone, Default)]
struct Pentachoron {
    adj: [Option<(usize, Perm5)>; 5],
}

/// An embedding of a tetrahedral face into a pentachoron.
///
/// `perm` carries the tetrahedron's canonical vertices 0..3 to vertex
/// positions of the pentachoron; `perm[4]` is the opposite vertex.
#[derive(Debug, Clone, Copy)]
pub struct TetrahedronEmbedding {
    pub pent: usize,
    pub perm: Perm5,
}

/// A tetrahedral face of a 4-dimensional triangulation.
#[derive(Debug, Clone)]
pub struct TetrahedronFace {
    pub embeddings: SmallVec<[TetrahedronEmbedding; 2]>,
}

impl TetrahedronFace {
    pub fn is_boundary(&self) -> bool {
        self.embeddings.len() == 1
    }
}

/// A triangulated 4-manifold, presented by pentachora and facet gluings.
#[derive(Debug)]
pub struct Triangulation4 {
    pents: Vec<Pentachoron>,
    tetrahedra: Vec<TetrahedronFace>,
    tables: PermTables,
}

impl Triangulation4 {
    /// Build a triangulation from a gluing list; same conventions as
    /// [`Triangulation3::from_gluings`](super::Triangulation3::from_gluings).
    pub fn from_gluings(
        n_pents: usize,
        gluings: &[(usize, usize, usize, [u8; 5])],
    ) -> Result<Self> {
        let tables = PermTables::new();
        let mut pents = vec![Pentachoron::default(); n_pents];
        for &(p, f, p2, images) in gluings {
            if p >= n_pents || p2 >= n_pents || f >= 5 {
                return Err(EnumError::InvalidInput(format!(
                    "gluing ({p}, {f}) out of range"
                )));
            }
            let perm = Perm5::from_images(images);
            let f2 = perm.image(f);
            if p == p2 && f == f2 {
                return Err(EnumError::InvalidInput(format!(
                    "facet ({p}, {f}) glued to itself"
                )));
            }
            if pents[p].adj[f].is_some() || pents[p2].adj[f2].is_some() {
                return Err(EnumError::InvalidInput(format!(
                    "facet ({p}, {f}) glued twice"
                )));
            }
            pents[p].adj[f] = Some((p2, perm));
            pents[p2].adj[f2] = Some((p, tables.inverse5(perm)));
        }

        let mut tri = Triangulation4 {
            pents,
            tetrahedra: Vec::new(),
            tables,
        };
        tri.compute_tetrahedra();
        Ok(tri)
    }

    /// The number of pentachora.
    pub fn size(&self) -> usize {
        self.pents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pents.is_empty()
    }

    pub fn tetrahedra(&self) -> &[TetrahedronFace] {
        &self.tetrahedra
    }

    pub fn tables(&self) -> &PermTables {
        &self.tables
    }

    fn compute_tetrahedra(&mut self) {
        let n = self.size();
        let mut seen = vec![[false; 5]; n];
        for p in 0..n {
            for f in 0..5 {
                if seen[p][f] {
                    continue;
                }
                seen[p][f] = true;
                let mut images = [0u8; 5];
                let mut pos = 0;
                for v in 0..5 {
                    if v != f {
                        images[pos] = v as u8;
                        pos += 1;
                    }
                }
                images[4] = f as u8;
                let perm = Perm5::from_images(images);
                let mut embeddings: SmallVec<[TetrahedronEmbedding; 2]> =
                    SmallVec::from_elem(TetrahedronEmbedding { pent: p, perm }, 1);
                if let Some((p2, g)) = self.pents[p].adj[f] {
                    let q = self.tables.compose5(g, perm);
                    seen[p2][q.image(4)] = true;
                    embeddings.push(TetrahedronEmbedding { pent: p2, perm: q });
                }
                self.tetrahedra.push(TetrahedronFace { embeddings });
            }
        }
    }
}
