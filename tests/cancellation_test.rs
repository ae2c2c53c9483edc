// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Cooperative cancellation semantics.

use surface_search::coords::NormalCoords;
use surface_search::surfaces::{enumerate_fundamental, enumerate_vertex, EnumHints, ListScope};
use surface_search::triangulation::sample;
use surface_search::{EnumError, ProgressTracker};

#[test]
fn test_cancelled_vertex_enumeration() {
    let tri = sample::figure_eight();
    for hints in [
        EnumHints::default(),
        EnumHints {
            prefer_dd: true,
            ..Default::default()
        },
    ] {
        let tracker = ProgressTracker::new();
        tracker.cancel();
        let err = enumerate_vertex(
            &tri,
            NormalCoords::Quad3,
            ListScope::EmbeddedOnly,
            hints,
            None,
            Some(&tracker),
        )
        .unwrap_err();
        assert_eq!(err, EnumError::Cancelled);
        // The tracker is marked finished even after cancellation.
        assert!(tracker.is_finished());
    }
}

#[test]
fn test_cancelled_fundamental_enumeration() {
    let tri = sample::figure_eight();
    let tracker = ProgressTracker::new();
    tracker.cancel();
    let err = enumerate_fundamental(
        &tri,
        NormalCoords::Quad3,
        ListScope::EmbeddedOnly,
        EnumHints::default(),
        None,
        Some(&tracker),
    )
    .unwrap_err();
    assert_eq!(err, EnumError::Cancelled);
    assert!(tracker.is_finished());
}

#[test]
fn test_uncancelled_run_completes_and_reports_progress() {
    let tri = sample::figure_eight();
    let tracker = ProgressTracker::new();
    let list = enumerate_vertex(
        &tri,
        NormalCoords::Quad3,
        ListScope::EmbeddedOnly,
        EnumHints::default(),
        None,
        Some(&tracker),
    )
    .unwrap();
    assert_eq!(list.len(), 4);
    assert!(tracker.is_finished());
    assert!(!tracker.is_cancelled());
}
