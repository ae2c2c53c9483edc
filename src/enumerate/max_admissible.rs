// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Maximal admissible faces of the solution cone.
//!
//! Starting from the admissible extremal rays (as support bitmasks), grow
//! faces level by level: each face is the union of the supports of the
//! rays it contains, and a face is admissible when that union still meets
//! every validity constraint in at most one position.  Faces that cannot
//! be extended by any ray without breaking a constraint are maximal.
//!
//! The primal Hilbert basis algorithm feeds each maximal face to an
//! unconstrained basis computation, so completeness here matters more
//! than speed; the antichain bookkeeping keeps the level sets small.

use crate::bitmask::Bitmask;
use crate::coords::ValidityConstraints;
use crate::maths::Int;

/// The support mask of a ray.
pub fn support_mask<B: Bitmask>(ray: &[Int]) -> B {
    let mut m = B::with_len(ray.len());
    for (i, c) in ray.iter().enumerate() {
        if !c.is_zero() {
            m.set(i, true);
        }
    }
    m
}

fn admissible<B: Bitmask>(face: &B, constraint_masks: &[B]) -> bool {
    constraint_masks.iter().all(|mask| {
        let mut m = face.clone();
        m.and_assign(mask);
        m.at_most_one_bit()
    })
}

/// Enumerate the maximal faces of the cone whose relative interior is
/// admissible, given the admissible extremal rays.
///
/// Both input and output are support bitmasks over `dim` coordinates.
/// The empty input gives the empty output.
pub fn max_admissible_faces<B: Bitmask>(
    rays: &[Vec<Int>],
    dim: usize,
    constraints: &ValidityConstraints,
) -> Vec<B> {
    let constraint_masks: Vec<B> = constraints.bitmasks(dim);
    let ray_masks: Vec<B> = rays.iter().map(|r| support_mask(r)).collect();

    // Level 0: the admissible 1-faces are exactly the input rays.
    let mut level: Vec<B> = Vec::new();
    for m in &ray_masks {
        if !level.contains(m) {
            level.push(m.clone());
        }
    }

    let mut maximal: Vec<B> = Vec::new();
    while !level.is_empty() {
        let mut next: Vec<B> = Vec::new();
        let mut extended = vec![false; level.len()];

        for (fi, face) in level.iter().enumerate() {
            for ray in &ray_masks {
                let mut grown = face.clone();
                grown.or_assign(ray);
                if grown == *face || !admissible(&grown, &constraint_masks) {
                    continue;
                }
                extended[fi] = true;

                // Maintain an antichain under inclusion: skip if a
                // superface is already present, drop strict subfaces.
                if next.iter().any(|h| h.contains(&grown)) {
                    continue;
                }
                next.retain(|h| !grown.contains(h));
                next.push(grown);
            }
        }

        for (fi, face) in level.iter().enumerate() {
            if !extended[fi] && !next.iter().any(|h| h.contains(face) && h != face) {
                maximal.push(face.clone());
            }
        }
        level = next;
    }
    maximal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmask::Bitmask64;
    use crate::coords::NormalCoords;

    fn ray(dim: usize, support: &[usize]) -> Vec<Int> {
        let mut v = vec![Int::ZERO; dim];
        for &i in support {
            v[i] = Int::ONE;
        }
        v
    }

    #[test]
    fn test_empty_input() {
        let faces: Vec<Bitmask64> =
            max_admissible_faces(&[], 6, &ValidityConstraints::for_coords(NormalCoords::Quad3, 2));
        assert!(faces.is_empty());
    }

    #[test]
    fn test_compatible_rays_merge() {
        // Two tetrahedra, quad constraints: rays in different blocks can
        // combine into one maximal face.
        let cons = ValidityConstraints::for_coords(NormalCoords::Quad3, 2);
        let rays = vec![ray(6, &[0]), ray(6, &[3])];
        let faces: Vec<Bitmask64> = max_admissible_faces(&rays, 6, &cons);
        assert_eq!(faces.len(), 1);
        assert!(faces[0].get(0) && faces[0].get(3));
        assert_eq!(faces[0].count(), 2);
    }

    #[test]
    fn test_incompatible_rays_stay_separate() {
        // Two rays using different quads of the same tetrahedron are
        // individually admissible but can never share a face.
        let cons = ValidityConstraints::for_coords(NormalCoords::Quad3, 1);
        let rays = vec![ray(3, &[0]), ray(3, &[1])];
        let mut faces: Vec<Bitmask64> = max_admissible_faces(&rays, 3, &cons);
        faces.sort_by_key(|f| (0..3).find(|&i| f.get(i)));
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].count(), 1);
        assert_eq!(faces[1].count(), 1);
    }

    #[test]
    fn test_mixed_compatibility() {
        // Rays: {0}, {1}, {3}.  Faces {0,3} and {1,3} are maximal;
        // neither {0} nor {1} nor {3} survives as maximal on its own.
        let cons = ValidityConstraints::for_coords(NormalCoords::Quad3, 2);
        let rays = vec![ray(6, &[0]), ray(6, &[1]), ray(6, &[3])];
        let faces: Vec<Bitmask64> = max_admissible_faces(&rays, 6, &cons);
        assert_eq!(faces.len(), 2);
        for f in &faces {
            assert_eq!(f.count(), 2);
            assert!(f.get(3));
        }
    }

    #[test]
    fn test_duplicate_rays_collapse() {
        let cons = ValidityConstraints::for_coords(NormalCoords::Quad3, 1);
        let rays = vec![ray(3, &[2]), ray(3, &[2])];
        let faces: Vec<Bitmask64> = max_admissible_faces(&rays, 3, &cons);
        assert_eq!(faces.len(), 1);
    }
}
