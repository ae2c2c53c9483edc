// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Three-dimensional triangulations and their derived skeleton.
//!
//! A [`Triangulation3`] is a set of tetrahedra with facet gluings.  From
//! the gluings we derive, with stable indices and ordered embedding
//! lists, everything the enumeration engine consumes: triangles (the
//! interior ones carry matching equations), edges (likewise in
//! quadrilateral coordinates), and vertices (whose links classify the
//! triangulation as closed or ideal, and drive the quad-to-standard
//! conversion).  The engine never mutates a triangulation.
//!
//! # Gluing convention
//!
//! `adj[f]` on tetrahedron `t` names the partner tetrahedron together
//! with the permutation carrying vertex labels of `t` to vertex labels of
//! the partner; face `f` of `t` (the face opposite vertex `f`) is glued
//! to face `perm[f]` of the partner.

use smallvec::SmallVec;

use crate::error::{EnumError, Result};
use crate::maths::perm::{Perm4, PermTables};

/// The six edges of a tetrahedron, by endpoint pair, in lexicographic order.
pub const EDGE_VERTICES: [(usize, usize); 6] = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];

/// One tetrahedron: four optional facet gluings.
#[derive(Debug, Clone, Default)]
struct Tetrahedron {
    adj: [Option<(usize, Perm4)>; 4],
}

/// An embedding of a triangle into a tetrahedron.
///
/// `perm` carries the triangle's canonical vertices 0..2 to vertex
/// positions of the tetrahedron; `perm[3]` is the opposite vertex.
#[derive(Debug, Clone, Copy)]
pub struct TriangleEmbedding {
    pub tet: usize,
    pub perm: Perm4,
}

/// A triangle of the triangulation (a codimension-1 face).
#[derive(Debug, Clone)]
pub struct Triangle {
    /// One embedding for a boundary triangle, two for an interior one.
    pub embeddings: SmallVec<[TriangleEmbedding; 2]>,
}

impl Triangle {
    pub fn is_boundary(&self) -> bool {
        self.embeddings.len() == 1
    }
}

/// An embedding of an edge into a tetrahedron.
///
/// `perm[0]` and `perm[1]` are the edge endpoints; walking to the next
/// embedding around the edge crosses the face opposite `perm[3]`.
#[derive(Debug, Clone, Copy)]
pub struct EdgeEmbedding {
    pub tet: usize,
    pub perm: Perm4,
}

/// An edge of the triangulation, with its embeddings in walk order.
#[derive(Debug, Clone)]
pub struct Edge {
    pub embeddings: Vec<EdgeEmbedding>,
    pub boundary: bool,
    /// False when the edge is identified with itself in reverse.
    pub valid: bool,
}

/// An embedding of a vertex into a tetrahedron.
#[derive(Debug, Clone, Copy)]
pub struct VertexEmbedding {
    pub tet: usize,
    pub vertex: usize,
}

/// A vertex of the triangulation with its link classification.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub embeddings: Vec<VertexEmbedding>,
    /// Euler characteristic of the vertex link.
    pub link_euler: i64,
    /// Whether the link is a closed surface.
    pub link_closed: bool,
    /// Closed link that is not a sphere.
    pub ideal: bool,
}

/// A triangulated 3-manifold, presented by tetrahedra and facet gluings.
#[derive(Debug)]
pub struct Triangulation3 {
    tets: Vec<Tetrahedron>,
    triangles: Vec<Triangle>,
    edges: Vec<Edge>,
    vertices: Vec<Vertex>,
    /// Vertex class of each (tetrahedron, vertex) pair.
    vertex_index: Vec<[usize; 4]>,
    valid: bool,
    tables: PermTables,
}

impl Triangulation3 {
    /// Build a triangulation from a gluing list.
    ///
    /// Each entry `(tet, face, adj_tet, images)` glues face `face` of
    /// `tet` to face `images[face]` of `adj_tet` under the given vertex
    /// permutation.  List each gluing once; the reverse direction is
    /// derived.
    ///
    /// Fails with `InvalidInput` if a facet is glued twice, a facet is
    /// glued to itself, or an index is out of range.
    pub fn from_gluings(n_tets: usize, gluings: &[(usize, usize, usize, [u8; 4])]) -> Result<Self> {
        let tables = PermTables::new();
        let mut tets = vec![Tetrahedron::default(); n_tets];
        for &(t, f, t2, images) in gluings {
            if t >= n_tets || t2 >= n_tets || f >= 4 {
                return Err(EnumError::InvalidInput(format!(
                    "gluing ({t}, {f}) out of range"
                )));
            }
            let perm = Perm4::from_images(images);
            let f2 = perm.image(f);
            if t == t2 && f == f2 {
                return Err(EnumError::InvalidInput(format!(
                    "face ({t}, {f}) glued to itself"
                )));
            }
            if tets[t].adj[f].is_some() {
                return Err(EnumError::InvalidInput(format!(
                    "face ({t}, {f}) glued twice"
                )));
            }
            if tets[t2].adj[f2].is_some() {
                return Err(EnumError::InvalidInput(format!(
                    "face ({t2}, {f2}) glued twice"
                )));
            }
            tets[t].adj[f] = Some((t2, perm));
            tets[t2].adj[f2] = Some((t, tables.inverse4(perm)));
        }

        let mut tri = Triangulation3 {
            tets,
            triangles: Vec::new(),
            edges: Vec::new(),
            vertices: Vec::new(),
            vertex_index: vec![[usize::MAX; 4]; n_tets],
            valid: true,
            tables,
        };
        tri.compute_triangles();
        tri.compute_edges();
        tri.compute_vertices();
        log::debug!(
            "skeleton: {} tets, {} triangles, {} edges, {} vertices, valid={}",
            tri.size(),
            tri.triangles.len(),
            tri.edges.len(),
            tri.vertices.len(),
            tri.valid
        );
        Ok(tri)
    }

    /// The number of tetrahedra.
    pub fn size(&self) -> usize {
        self.tets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tets.is_empty()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// The vertex class containing vertex `v` of tetrahedron `t`.
    pub fn vertex_class(&self, t: usize, v: usize) -> usize {
        self.vertex_index[t][v]
    }

    /// The gluing on face `f` of tetrahedron `t`, if any.
    pub fn adjacent(&self, t: usize, f: usize) -> Option<(usize, Perm4)> {
        self.tets[t].adj[f]
    }

    /// The permutation tables owned by this triangulation.
    pub fn tables(&self) -> &PermTables {
        &self.tables
    }

    /// No edge is identified with itself in reverse.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Some vertex link is closed but not a sphere.
    pub fn is_ideal(&self) -> bool {
        self.vertices.iter().any(|v| v.ideal)
    }

    /// No boundary facets, no ideal vertices, and valid.
    pub fn is_closed(&self) -> bool {
        self.valid
            && !self.is_ideal()
            && self
                .tets
                .iter()
                .all(|t| t.adj.iter().all(Option::is_some))
    }

    /// Whether the tetrahedra admit a consistent orientation.
    pub fn is_orientable(&self) -> bool {
        // 2-colour by gluing parity: a gluing is orientation-consistent
        // when its permutation is odd.
        let n = self.size();
        if n == 0 {
            return true;
        }
        let mut colour = vec![0i8; n];
        for start in 0..n {
            if colour[start] != 0 {
                continue;
            }
            colour[start] = 1;
            let mut stack = vec![start];
            while let Some(t) = stack.pop() {
                for f in 0..4 {
                    if let Some((t2, p)) = self.tets[t].adj[f] {
                        let want = if p.sign() < 0 {
                            colour[t]
                        } else {
                            -colour[t]
                        };
                        if colour[t2] == 0 {
                            colour[t2] = want;
                            stack.push(t2);
                        } else if colour[t2] != want {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    fn compute_triangles(&mut self) {
        let n = self.size();
        let mut seen = vec![[false; 4]; n];
        for t in 0..n {
            for f in 0..4 {
                if seen[t][f] {
                    continue;
                }
                seen[t][f] = true;
                let mut images = [0u8; 4];
                let mut pos = 0;
                for v in 0..4 {
                    if v != f {
                        images[pos] = v as u8;
                        pos += 1;
                    }
                }
                images[3] = f as u8;
                let perm = Perm4::from_images(images);
                let mut embeddings: SmallVec<[TriangleEmbedding; 2]> =
                    SmallVec::from_elem(TriangleEmbedding { tet: t, perm }, 1);
                if let Some((t2, g)) = self.tets[t].adj[f] {
                    let p2 = self.tables.compose4(g, perm);
                    seen[t2][p2.image(3)] = true;
                    embeddings.push(TriangleEmbedding { tet: t2, perm: p2 });
                }
                self.triangles.push(Triangle { embeddings });
            }
        }
    }

    fn compute_edges(&mut self) {
        let n = self.size();
        // Edge slot index per (tet, edge number), or MAX if unclaimed.
        let mut claimed = vec![[false; 6]; n];
        let swap23 = Perm4::from_images([0, 1, 3, 2]);

        for t in 0..n {
            for (e, &(a, b)) in EDGE_VERTICES.iter().enumerate() {
                if claimed[t][e] {
                    continue;
                }
                let mut images = [0u8; 4];
                images[0] = a as u8;
                images[1] = b as u8;
                let mut pos = 2;
                for v in 0..4 {
                    if v != a && v != b {
                        images[pos] = v as u8;
                        pos += 1;
                    }
                }
                let start = Perm4::from_images(images);
                let mut embeddings = vec![EdgeEmbedding { tet: t, perm: start }];
                let mut valid = true;
                let mut closed = false;

                // Walk forwards, crossing the face opposite perm[3].
                let mut cur = (t, start);
                loop {
                    let (ct, cp) = cur;
                    let Some((nt, g)) = self.tets[ct].adj[cp.image(3)] else {
                        break;
                    };
                    let np = self
                        .tables
                        .compose4(self.tables.compose4(g, cp), swap23);
                    if nt == t && edge_number(np.image(0), np.image(1)) == e {
                        if np.image(0) != a {
                            valid = false;
                        }
                        closed = true;
                        break;
                    }
                    embeddings.push(EdgeEmbedding { tet: nt, perm: np });
                    cur = (nt, np);
                }
                if !closed {
                    // Walk backwards from the start, crossing the face
                    // opposite perm[2], prepending as we go.
                    let mut cur = (t, start);
                    loop {
                        let (ct, cp) = cur;
                        let Some((nt, g)) = self.tets[ct].adj[cp.image(2)] else {
                            break;
                        };
                        let np = self
                            .tables
                            .compose4(self.tables.compose4(g, cp), swap23);
                        embeddings.insert(0, EdgeEmbedding { tet: nt, perm: np });
                        cur = (nt, np);
                    }
                }
                for emb in &embeddings {
                    claimed[emb.tet][edge_number(emb.perm.image(0), emb.perm.image(1))] = true;
                }
                if !valid {
                    self.valid = false;
                }
                self.edges.push(Edge {
                    embeddings,
                    boundary: !closed,
                    valid,
                });
            }
        }
    }

    fn compute_vertices(&mut self) {
        let n = self.size();
        for t in 0..n {
            for v in 0..4 {
                if self.vertex_index[t][v] != usize::MAX {
                    continue;
                }
                let id = self.vertices.len();
                let mut embeddings = Vec::new();
                let mut stack = vec![(t, v)];
                self.vertex_index[t][v] = id;
                while let Some((ct, cv)) = stack.pop() {
                    embeddings.push(VertexEmbedding { tet: ct, vertex: cv });
                    for f in 0..4 {
                        if f == cv {
                            continue;
                        }
                        if let Some((nt, g)) = self.tets[ct].adj[f] {
                            let nv = g.image(cv);
                            if self.vertex_index[nt][nv] == usize::MAX {
                                self.vertex_index[nt][nv] = id;
                                stack.push((nt, nv));
                            }
                        }
                    }
                }
                self.vertices.push(Vertex {
                    embeddings,
                    link_euler: 0,
                    link_closed: false,
                    ideal: false,
                });
            }
        }

        // Classify each link.  Faces of the link are the corners; edges
        // come from (corner, face) incidences; vertices from edge ends.
        let mut link_v = vec![0i64; self.vertices.len()];
        for edge in &self.edges {
            let emb = &edge.embeddings[0];
            for end in 0..2 {
                let cls = self.vertex_index[emb.tet][emb.perm.image(end)];
                link_v[cls] += 1;
            }
        }
        for (id, vertex) in self.vertices.iter_mut().enumerate() {
            let faces = vertex.embeddings.len() as i64;
            let mut interior_pairs = 0i64;
            let mut boundary_pairs = 0i64;
            for emb in &vertex.embeddings {
                for f in 0..4 {
                    if f == emb.vertex {
                        continue;
                    }
                    if self.tets[emb.tet].adj[f].is_some() {
                        interior_pairs += 1;
                    } else {
                        boundary_pairs += 1;
                    }
                }
            }
            let link_e = interior_pairs / 2 + boundary_pairs;
            vertex.link_euler = link_v[id] - link_e + faces;
            vertex.link_closed = boundary_pairs == 0;
            vertex.ideal = vertex.link_closed && vertex.link_euler != 2;
        }
    }
}

/// The edge number of the edge with the given endpoints.
pub fn edge_number(a: usize, b: usize) -> usize {
    let (a, b) = if a < b { (a, b) } else { (b, a) };
    EDGE_VERTICES
        .iter()
        .position(|&(x, y)| (x, y) == (a, b))
        .expect("distinct vertices in 0..4")
}
