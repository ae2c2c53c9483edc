// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Surface lists and the public enumeration entry points.
//!
//! [`enumerate_vertex`] and [`enumerate_fundamental`] select an
//! algorithm from the coordinate system, the list kind and the caller's
//! hints, run it, and return the solutions as a [`SurfaceList`] of
//! primitive integer vectors.  [`find_single`] runs the single-solution
//! tree search, optionally under extra linear constraints such as
//! positive Euler characteristic.
//!
//! Algorithm selection, in outline:
//!
//! * vertex enumeration prefers the tree traversal where it is
//!   supported, falling back to double description; standard coordinate
//!   systems are preferably enumerated via the reduced (quadrilateral)
//!   system and converted, unless the triangulation is ideal or invalid,
//!   in which case the enumeration runs directly;
//! * fundamental enumeration prefers the primal Hilbert algorithm for
//!   embedded lists and the dual algorithm otherwise, with
//!   Contejean-Devie and the full-cone pipeline available on request.
//!
//! Native integer widths are chosen from a Hadamard-style bound on the
//! matching equations; an overflow inside the tableau is caught here and
//! the search retried one width up, so callers never observe it.

pub mod quad_to_std;
pub mod serial;

use log::debug;

use crate::bitmask::{with_bitmask_for, Bitmask, WithBitmask};
use crate::coords::matching::{matching_equations, matching_equations_dim4, SlopeOracle};
use crate::coords::{NormalCoords, ValidityConstraints};
use crate::enumerate::dd::enumerate_extremal_rays;
use crate::enumerate::lp::{select_width, ExtraConstraint, LpInt, LpWidth};
use crate::enumerate::tree::{TreeEnumeration, TreeSingleSoln, TreeTraversal};
use crate::enumerate::{hilbert_cd, hilbert_dual, hilbert_full_cone, hilbert_primal};
use crate::error::{EnumError, Result};
use crate::maths::{Int, MatrixInt};
use crate::progress::{ProgressTracker, SearchStatistics};
use crate::triangulation::{Triangulation3, Triangulation4};

pub use quad_to_std::quad_to_std;
pub use serial::{read_surface, write_surface};

/// Vertex solutions or a full Hilbert basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Vertex,
    Fundamental,
}

/// Whether admissibility (embedded surfaces only) is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    EmbeddedOnly,
    ImmersedSingular,
}

/// A back-end for fundamental (Hilbert basis) enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HilbertBackend {
    Primal,
    Dual,
    ContejeanDevie,
    FullCone,
}

/// Caller preferences for algorithm selection.  All fields default to
/// "let the engine decide"; a preference is ignored when the chosen
/// combination cannot support it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumHints {
    pub prefer_tree: bool,
    pub prefer_dd: bool,
    pub prefer_via_reduced: bool,
    pub prefer_direct: bool,
    /// Preferred fundamental back-end, if any.
    pub hilbert: Option<HilbertBackend>,
}

/// The algorithm that actually produced a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Nothing to do (empty triangulation).
    Trivial,
    TreeDirect,
    DoubleDescriptionDirect,
    /// Enumerated in quadrilateral coordinates, then converted.
    ViaReduced,
    HilbertPrimal,
    HilbertDual,
    HilbertCd,
    HilbertFullCone,
}

/// One surface: a primitive admissible integer vector in a known
/// coordinate system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceVector {
    pub coords: NormalCoords,
    pub values: Vec<Int>,
}

/// The result of one enumeration run.
#[derive(Debug)]
pub struct SurfaceList {
    pub coords: NormalCoords,
    pub kind: ListKind,
    pub scope: ListScope,
    pub algorithm: Algorithm,
    pub surfaces: Vec<SurfaceVector>,
    pub stats: SearchStatistics,
}

impl SurfaceList {
    fn new(coords: NormalCoords, kind: ListKind, scope: ListScope, algorithm: Algorithm) -> Self {
        SurfaceList {
            coords,
            kind,
            scope,
            algorithm,
            surfaces: Vec::new(),
            stats: SearchStatistics::default(),
        }
    }

    fn with_vectors(mut self, vectors: Vec<Vec<Int>>) -> Self {
        self.stats.solutions = vectors.len() as u64;
        self.surfaces = vectors
            .into_iter()
            .map(|values| SurfaceVector {
                coords: self.coords,
                values,
            })
            .collect();
        self
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

/// Marks the tracker finished on every exit path of an enumeration.
struct FinishGuard<'a>(Option<&'a ProgressTracker>);

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        if let Some(t) = self.0 {
            t.set_finished();
        }
    }
}

struct DdJob<'a> {
    eqns: &'a MatrixInt,
    constraints: &'a ValidityConstraints,
    tracker: Option<&'a ProgressTracker>,
}

impl<'a> WithBitmask for DdJob<'a> {
    type Output = Result<Vec<Vec<Int>>>;
    fn run<B: Bitmask>(self) -> Self::Output {
        enumerate_extremal_rays::<B>(self.eqns, self.constraints, self.tracker, 0)
    }
}

fn run_tree_enumeration<T: LpInt>(
    tri: &Triangulation3,
    coords: NormalCoords,
    tracker: Option<&ProgressTracker>,
) -> Result<(Vec<Vec<Int>>, SearchStatistics)> {
    let mut search: TreeEnumeration<T> = TreeEnumeration::new(tri, coords)?;
    let mut out = Vec::new();
    while search.next(tracker)? {
        out.push(search.build_surface());
    }
    Ok((out, search.statistics()))
}

/// Run `f` at increasing integer widths until it no longer overflows.
fn with_widening<R>(start: LpWidth, mut f: impl FnMut(LpWidth) -> Result<R>) -> Result<R> {
    let mut width = start;
    loop {
        match f(width) {
            Err(EnumError::Overflow) if width != LpWidth::Arbitrary => {
                debug!("tableau overflow at {width:?}; retrying wider");
                width = width.widen();
            }
            other => return other,
        }
    }
}

fn tree_vertex_rays(
    tri: &Triangulation3,
    coords: NormalCoords,
    tracker: Option<&ProgressTracker>,
) -> Result<(Vec<Vec<Int>>, SearchStatistics)> {
    let lp_coords = if coords.stores_triangles() {
        NormalCoords::Std3
    } else {
        NormalCoords::Quad3
    };
    let eqns = matching_equations(tri, lp_coords, None)?;
    let start = select_width(&eqns, coords.stores_octagons());
    with_widening(start, |width| match width {
        LpWidth::I64 => run_tree_enumeration::<i64>(tri, coords, tracker),
        LpWidth::I128 => run_tree_enumeration::<i128>(tri, coords, tracker),
        LpWidth::Arbitrary => run_tree_enumeration::<Int>(tri, coords, tracker),
    })
}

/// Enumerate the vertex surfaces of a 3-dimensional triangulation.
///
/// Emits one primitive integer vector per extreme ray of the admissible
/// cone (embedded mode) or of the full matching cone (immersed-singular
/// mode).  Output order is deterministic for fixed inputs and algorithm
/// selection.  `oracle` is consulted only by the closed coordinate
/// variants.
pub fn enumerate_vertex(
    tri: &Triangulation3,
    coords: NormalCoords,
    scope: ListScope,
    hints: EnumHints,
    oracle: Option<&dyn SlopeOracle>,
    tracker: Option<&ProgressTracker>,
) -> Result<SurfaceList> {
    if coords.is_dim4() {
        return Err(EnumError::InvalidCoordinateSystem(
            "Std4 enumeration takes a 4-dimensional triangulation".into(),
        ));
    }
    let _guard = FinishGuard(tracker);

    if tri.is_empty() {
        return Ok(SurfaceList::new(coords, ListKind::Vertex, scope, Algorithm::Trivial));
    }

    // Tree vs double description: the tree is the default wherever it
    // is supported; admissibility is built into its branching, so
    // immersed lists always go through double description.
    let tree = TreeTraversal::<i64>::supported(coords)
        && scope == ListScope::EmbeddedOnly
        && !hints.prefer_dd;

    // Standard systems prefer enumerating the reduced system and
    // converting, which needs embedded mode and a valid, non-ideal
    // triangulation.
    let via_reduced = coords.reduced().is_some()
        && scope == ListScope::EmbeddedOnly
        && tri.is_valid()
        && !tri.is_ideal()
        && !hints.prefer_direct;

    if via_reduced {
        let reduced = coords.reduced().expect("standard system has a reduced form");
        debug!("vertex enumeration in {coords:?} via {reduced:?}");
        let inner = enumerate_vertex(
            tri,
            reduced,
            scope,
            EnumHints {
                prefer_direct: true,
                ..hints
            },
            oracle,
            None,
        )?;
        let quad_rays: Vec<Vec<Int>> = inner.surfaces.into_iter().map(|s| s.values).collect();
        let std_rays = quad_to_std(tri, reduced, &quad_rays, tracker)?;
        let mut list = SurfaceList::new(coords, ListKind::Vertex, scope, Algorithm::ViaReduced)
            .with_vectors(std_rays);
        list.stats.nodes_visited = inner.stats.nodes_visited;
        return Ok(list);
    }

    if tree {
        debug!("vertex enumeration in {coords:?} by tree traversal");
        let (rays, stats) = tree_vertex_rays(tri, coords, tracker)?;
        let mut list = SurfaceList::new(coords, ListKind::Vertex, scope, Algorithm::TreeDirect)
            .with_vectors(rays);
        list.stats.nodes_visited = stats.nodes_visited;
        return Ok(list);
    }

    debug!("vertex enumeration in {coords:?} by double description");
    let eqns = matching_equations(tri, coords, oracle)?;
    let constraints = match scope {
        ListScope::EmbeddedOnly => ValidityConstraints::for_coords(coords, tri.size()),
        ListScope::ImmersedSingular => ValidityConstraints::none(),
    };
    let rays = with_bitmask_for(
        eqns.cols(),
        DdJob {
            eqns: &eqns,
            constraints: &constraints,
            tracker,
        },
    )?;
    Ok(
        SurfaceList::new(coords, ListKind::Vertex, scope, Algorithm::DoubleDescriptionDirect)
            .with_vectors(rays),
    )
}

/// Enumerate the vertex normal hypersurfaces of a 4-dimensional
/// triangulation in standard coordinates.
pub fn enumerate_vertex_dim4(
    tri: &Triangulation4,
    scope: ListScope,
    tracker: Option<&ProgressTracker>,
) -> Result<SurfaceList> {
    let _guard = FinishGuard(tracker);
    let coords = NormalCoords::Std4;

    if tri.is_empty() {
        return Ok(SurfaceList::new(coords, ListKind::Vertex, scope, Algorithm::Trivial));
    }

    let eqns = matching_equations_dim4(tri)?;
    let constraints = match scope {
        ListScope::EmbeddedOnly => ValidityConstraints::for_coords(coords, tri.size()),
        ListScope::ImmersedSingular => ValidityConstraints::none(),
    };
    let rays = with_bitmask_for(
        eqns.cols(),
        DdJob {
            eqns: &eqns,
            constraints: &constraints,
            tracker,
        },
    )?;
    Ok(
        SurfaceList::new(coords, ListKind::Vertex, scope, Algorithm::DoubleDescriptionDirect)
            .with_vectors(rays),
    )
}

struct HilbertJob<'a> {
    backend: HilbertBackend,
    eqns: &'a MatrixInt,
    constraints: &'a ValidityConstraints,
    rays: Option<&'a [Vec<Int>]>,
    tracker: Option<&'a ProgressTracker>,
}

impl<'a> WithBitmask for HilbertJob<'a> {
    type Output = Result<Vec<Vec<Int>>>;
    fn run<B: Bitmask>(self) -> Self::Output {
        match self.backend {
            HilbertBackend::Primal => hilbert_primal::<B>(
                self.rays.expect("primal needs vertex rays"),
                self.eqns,
                self.constraints,
                self.tracker,
            ),
            HilbertBackend::Dual => {
                hilbert_dual::<B>(self.eqns, self.constraints, self.tracker, 0)
            }
            HilbertBackend::ContejeanDevie => {
                hilbert_cd::<B>(self.eqns, self.constraints, self.tracker)
            }
            HilbertBackend::FullCone => {
                hilbert_full_cone::<B>(self.eqns, self.constraints, self.tracker)
            }
        }
    }
}

/// Enumerate a Hilbert basis of the admissible monoid (embedded mode)
/// or of the full solution monoid (immersed-singular mode).
pub fn enumerate_fundamental(
    tri: &Triangulation3,
    coords: NormalCoords,
    scope: ListScope,
    hints: EnumHints,
    oracle: Option<&dyn SlopeOracle>,
    tracker: Option<&ProgressTracker>,
) -> Result<SurfaceList> {
    if coords.is_dim4() {
        return Err(EnumError::InvalidCoordinateSystem(
            "Std4 enumeration takes a 4-dimensional triangulation".into(),
        ));
    }
    let _guard = FinishGuard(tracker);

    if tri.is_empty() {
        return Ok(SurfaceList::new(
            coords,
            ListKind::Fundamental,
            scope,
            Algorithm::Trivial,
        ));
    }

    let mut backend = hints.hilbert.unwrap_or(match scope {
        ListScope::EmbeddedOnly => HilbertBackend::Primal,
        ListScope::ImmersedSingular => HilbertBackend::Dual,
    });
    // The primal route decomposes the cone along the admissibility
    // constraints; without them it degenerates into the dual algorithm.
    if backend == HilbertBackend::Primal && scope == ListScope::ImmersedSingular {
        debug!("primal Hilbert needs admissibility constraints; using dual");
        backend = HilbertBackend::Dual;
    }

    let eqns = matching_equations(tri, coords, oracle)?;
    let constraints = match scope {
        ListScope::EmbeddedOnly => ValidityConstraints::for_coords(coords, tri.size()),
        ListScope::ImmersedSingular => ValidityConstraints::none(),
    };

    let rays;
    let rays_ref = if backend == HilbertBackend::Primal {
        let vertex = enumerate_vertex(tri, coords, scope, hints, oracle, None)?;
        rays = vertex
            .surfaces
            .into_iter()
            .map(|s| s.values)
            .collect::<Vec<_>>();
        Some(&rays[..])
    } else {
        None
    };

    let algorithm = match backend {
        HilbertBackend::Primal => Algorithm::HilbertPrimal,
        HilbertBackend::Dual => Algorithm::HilbertDual,
        HilbertBackend::ContejeanDevie => Algorithm::HilbertCd,
        HilbertBackend::FullCone => Algorithm::HilbertFullCone,
    };
    debug!("fundamental enumeration in {coords:?} by {algorithm:?}");

    let basis = with_bitmask_for(
        eqns.cols(),
        HilbertJob {
            backend,
            eqns: &eqns,
            constraints: &constraints,
            rays: rays_ref,
            tracker,
        },
    )?;
    Ok(SurfaceList::new(coords, ListKind::Fundamental, scope, algorithm).with_vectors(basis))
}

fn run_single_soln<T: LpInt>(
    tri: &Triangulation3,
    coords: NormalCoords,
    extra: Option<&dyn ExtraConstraint>,
    tracker: Option<&ProgressTracker>,
) -> Result<Option<Vec<Int>>> {
    let mut search: TreeSingleSoln<T> = TreeSingleSoln::new(tri, coords, extra)?;
    Ok(if search.find(tracker)? {
        Some(search.build_surface())
    } else {
        None
    })
}

/// Search for a single surface satisfying the given extra constraints,
/// without enumerating the whole solution set.
///
/// Runs the tree search in single-solution mode, which requires a
/// coordinate system with triangle coordinates (the search pins
/// triangles to zero to steer away from vertex-linking solutions).
/// Returns `Ok(None)` when no such surface exists; that answer is as
/// definitive as a found surface.
pub fn find_single(
    tri: &Triangulation3,
    coords: NormalCoords,
    extra: Option<&dyn ExtraConstraint>,
    tracker: Option<&ProgressTracker>,
) -> Result<Option<SurfaceVector>> {
    if !TreeTraversal::<i64>::supported(coords) || !coords.stores_triangles() {
        return Err(EnumError::InvalidCoordinateSystem(
            "single-solution search needs standard tree coordinates".into(),
        ));
    }
    if let Some(e) = extra {
        if !e.supported(coords) {
            return Err(EnumError::InvalidCoordinateSystem(
                "extra constraint unsupported in this coordinate system".into(),
            ));
        }
    }
    let _guard = FinishGuard(tracker);

    if tri.is_empty() {
        return Ok(None);
    }

    let eqns = matching_equations(tri, NormalCoords::Std3, None)?;
    let start = select_width(&eqns, coords.stores_octagons());
    let found = with_widening(start, |width| match width {
        LpWidth::I64 => run_single_soln::<i64>(tri, coords, extra, tracker),
        LpWidth::I128 => run_single_soln::<i128>(tri, coords, extra, tracker),
        LpWidth::Arbitrary => run_single_soln::<Int>(tri, coords, extra, tracker),
    })?;
    Ok(found.map(|values| SurfaceVector { coords, values }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangulation::sample;

    fn ints(xs: &[i64]) -> Vec<Int> {
        xs.iter().map(|&x| Int::from(x)).collect()
    }

    fn values(list: &SurfaceList) -> Vec<Vec<Int>> {
        list.surfaces.iter().map(|s| s.values.clone()).collect()
    }

    #[test]
    fn test_empty_triangulation() {
        let tri = Triangulation3::from_gluings(0, &[]).unwrap();
        let list = enumerate_vertex(
            &tri,
            NormalCoords::Quad3,
            ListScope::EmbeddedOnly,
            EnumHints::default(),
            None,
            None,
        )
        .unwrap();
        assert!(list.is_empty());
        assert_eq!(list.algorithm, Algorithm::Trivial);
    }

    #[test]
    fn test_tree_is_default_for_quad() {
        let tri = sample::figure_eight();
        let list = enumerate_vertex(
            &tri,
            NormalCoords::Quad3,
            ListScope::EmbeddedOnly,
            EnumHints::default(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(list.algorithm, Algorithm::TreeDirect);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_dd_hint_respected_and_agrees() {
        let tri = sample::figure_eight();
        let tree = enumerate_vertex(
            &tri,
            NormalCoords::Quad3,
            ListScope::EmbeddedOnly,
            EnumHints::default(),
            None,
            None,
        )
        .unwrap();
        let dd = enumerate_vertex(
            &tri,
            NormalCoords::Quad3,
            ListScope::EmbeddedOnly,
            EnumHints {
                prefer_dd: true,
                ..Default::default()
            },
            None,
            None,
        )
        .unwrap();
        assert_eq!(dd.algorithm, Algorithm::DoubleDescriptionDirect);
        let mut a = values(&tree);
        let mut b = values(&dd);
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ideal_standard_falls_back_to_direct() {
        let tri = sample::figure_eight();
        let list = enumerate_vertex(
            &tri,
            NormalCoords::Std3,
            ListScope::EmbeddedOnly,
            EnumHints::default(),
            None,
            None,
        )
        .unwrap();
        assert_ne!(list.algorithm, Algorithm::ViaReduced);
        assert!(!list.is_empty());
    }

    #[test]
    fn test_via_reduced_selected_for_closed_manifold() {
        let tri = sample::s3_one_tet();
        let list = enumerate_vertex(
            &tri,
            NormalCoords::Std3,
            ListScope::EmbeddedOnly,
            EnumHints::default(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(list.algorithm, Algorithm::ViaReduced);
        assert!(!list.is_empty());
    }

    #[test]
    fn test_immersed_uses_dd_without_constraints() {
        let tri = sample::figure_eight();
        let list = enumerate_vertex(
            &tri,
            NormalCoords::Quad3,
            ListScope::ImmersedSingular,
            EnumHints::default(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(list.algorithm, Algorithm::DoubleDescriptionDirect);
        // The unconstrained cone has at least as many rays.
        assert!(list.len() >= 4);
    }

    #[test]
    fn test_fundamental_backends_agree() {
        let tri = sample::s3_one_tet();
        let mut results = Vec::new();
        for backend in [
            HilbertBackend::Primal,
            HilbertBackend::Dual,
            HilbertBackend::ContejeanDevie,
            HilbertBackend::FullCone,
        ] {
            let list = enumerate_fundamental(
                &tri,
                NormalCoords::Quad3,
                ListScope::EmbeddedOnly,
                EnumHints {
                    hilbert: Some(backend),
                    ..Default::default()
                },
                None,
                None,
            )
            .unwrap();
            let mut v = values(&list);
            v.sort();
            results.push(v);
        }
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(results[0], vec![ints(&[0, 0, 1])]);
    }

    #[test]
    fn test_find_single_requires_triangles() {
        let tri = sample::s3_one_tet();
        let err = find_single(&tri, NormalCoords::Quad3, None, None).unwrap_err();
        assert!(matches!(err, EnumError::InvalidCoordinateSystem(_)));
    }

    #[test]
    fn test_dim4_vertex_enumeration() {
        let tri = sample::s4_doubled();
        let list = enumerate_vertex_dim4(&tri, ListScope::EmbeddedOnly, None).unwrap();
        assert!(!list.is_empty());
        let eqns = matching_equations_dim4(&tri).unwrap();
        let cons = ValidityConstraints::for_coords(NormalCoords::Std4, tri.size());
        for s in &list.surfaces {
            for r in 0..eqns.rows() {
                assert!(eqns.row_dot(r, &s.values).is_zero());
            }
            assert!(cons.admissible(&s.values));
        }
    }

    #[test]
    fn test_tracker_marked_finished() {
        let tri = sample::s3_one_tet();
        let tracker = ProgressTracker::new();
        enumerate_vertex(
            &tri,
            NormalCoords::Quad3,
            ListScope::EmbeddedOnly,
            EnumHints::default(),
            None,
            Some(&tracker),
        )
        .unwrap();
        assert!(tracker.is_finished());
    }
}
