// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Fixed-size permutations packed into machine words.
//!
//! [`Perm<N>`] represents an element of the symmetric group Sₙ for small
//! `N` (up to 6), storing the image of each point in a 3-bit field of a
//! single `u32`.  Composition, inverse and sign are computed directly on
//! the packed form; [`Perm::index`] gives the lexicographic rank within
//! Sₙ, which is the canonical "index-packed" value used for table lookups.
//!
//! [`PermTables`] holds precomputed product and inverse tables for S₄ and
//! S₅.  It is an owned value, built once per triangulation and threaded to
//! the code that composes permutations in inner loops; there is no
//! process-wide hidden state.

use std::fmt;

/// A permutation of `{0, .., N-1}` with images packed 3 bits per point.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Perm<const N: usize> {
    code: u32,
}

impl<const N: usize> Perm<N> {
    /// The identity permutation.
    pub fn identity() -> Self {
        let mut code = 0u32;
        for i in 0..N {
            code |= (i as u32) << (3 * i);
        }
        Perm { code }
    }

    /// Build a permutation from its image array.
    ///
    /// # Panics
    ///
    /// Panics if `images` is not a permutation of `0..N`.
    pub fn from_images(images: [u8; N]) -> Self {
        let mut seen = [false; N];
        let mut code = 0u32;
        for (i, &v) in images.iter().enumerate() {
            let v = v as usize;
            assert!(v < N && !seen[v], "not a permutation: {images:?}");
            seen[v] = true;
            code |= (v as u32) << (3 * i);
        }
        Perm { code }
    }

    /// The image of `i`.
    #[inline]
    pub fn image(&self, i: usize) -> usize {
        debug_assert!(i < N);
        ((self.code >> (3 * i)) & 7) as usize
    }

    /// The point mapping to `i`.
    #[inline]
    pub fn pre_image(&self, i: usize) -> usize {
        for j in 0..N {
            if self.image(j) == i {
                return j;
            }
        }
        unreachable!("not a permutation")
    }

    /// The image array.
    pub fn images(&self) -> [u8; N] {
        let mut out = [0u8; N];
        for (i, o) in out.iter_mut().enumerate() {
            *o = self.image(i) as u8;
        }
        out
    }

    /// Composition: `(self * other)(i) = self(other(i))`.
    pub fn compose(&self, other: &Perm<N>) -> Perm<N> {
        let mut code = 0u32;
        for i in 0..N {
            code |= (self.image(other.image(i)) as u32) << (3 * i);
        }
        Perm { code }
    }

    /// The inverse permutation.
    pub fn inverse(&self) -> Perm<N> {
        let mut code = 0u32;
        for i in 0..N {
            code |= (i as u32) << (3 * self.image(i));
        }
        Perm { code }
    }

    /// The sign: +1 for even permutations, -1 for odd.
    pub fn sign(&self) -> i8 {
        let mut inversions = 0;
        for i in 0..N {
            for j in i + 1..N {
                if self.image(i) > self.image(j) {
                    inversions += 1;
                }
            }
        }
        if inversions % 2 == 0 {
            1
        } else {
            -1
        }
    }

    /// The lexicographic rank of this permutation within Sₙ.
    pub fn index(&self) -> usize {
        let mut rank = 0;
        for i in 0..N {
            let vi = self.image(i);
            let smaller_later = (i + 1..N).filter(|&j| self.image(j) < vi).count();
            rank = rank * (N - i) + smaller_later;
        }
        rank
    }

    /// The permutation of the given lexicographic rank.
    ///
    /// # Panics
    ///
    /// Panics if `index >= N!`.
    pub fn from_index(index: usize) -> Perm<N> {
        let mut factorial = 1;
        for k in 2..=N {
            factorial *= k;
        }
        assert!(index < factorial, "index {index} out of range for S{N}");
        let mut remaining: Vec<u8> = (0..N as u8).collect();
        let mut rank = index;
        let mut images = [0u8; N];
        for (i, img) in images.iter_mut().enumerate() {
            factorial /= N - i;
            let pick = rank / factorial;
            rank %= factorial;
            *img = remaining.remove(pick);
        }
        Perm::from_images(images)
    }
}

impl<const N: usize> fmt::Debug for Perm<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Perm{:?}", self.images())
    }
}

impl<const N: usize> fmt::Display for Perm<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..N {
            write!(f, "{}", self.image(i))?;
        }
        Ok(())
    }
}

/// A tetrahedron vertex permutation.
pub type Perm4 = Perm<4>;
/// A pentachoron vertex permutation.
pub type Perm5 = Perm<5>;

const S4_SIZE: usize = 24;
const S5_SIZE: usize = 120;

/// Precomputed product and inverse tables for S₄ and S₅.
///
/// Indexed by lexicographic rank.  Construct one per triangulation and
/// pass it wherever permutations are composed in a loop.
pub struct PermTables {
    s4_perms: [Perm4; S4_SIZE],
    s4_index_of: Box<[u8]>,
    s4_product: Box<[[u8; S4_SIZE]; S4_SIZE]>,
    s4_inverse: [u8; S4_SIZE],
    s5_perms: [Perm5; S5_SIZE],
    s5_index_of: Box<[u8]>,
    s5_product: Box<[u8]>,
    s5_inverse: [u8; S5_SIZE],
}

impl PermTables {
    /// Build the full product tables.  A few tens of kilobytes; cheap
    /// enough to construct per enumeration run.
    pub fn new() -> PermTables {
        let mut s4_perms = [Perm4::identity(); S4_SIZE];
        for (i, p) in s4_perms.iter_mut().enumerate() {
            *p = Perm4::from_index(i);
        }
        let mut s4_index_of = vec![0u8; 1 << 12].into_boxed_slice();
        for (i, p) in s4_perms.iter().enumerate() {
            s4_index_of[p.code as usize] = i as u8;
        }
        let mut s4_product = Box::new([[0u8; S4_SIZE]; S4_SIZE]);
        let mut s4_inverse = [0u8; S4_SIZE];
        for (i, p) in s4_perms.iter().enumerate() {
            s4_inverse[i] = p.inverse().index() as u8;
            for (j, q) in s4_perms.iter().enumerate() {
                s4_product[i][j] = p.compose(q).index() as u8;
            }
        }

        let mut s5_perms = [Perm5::identity(); S5_SIZE];
        for (i, p) in s5_perms.iter_mut().enumerate() {
            *p = Perm5::from_index(i);
        }
        let mut s5_index_of = vec![0u8; 1 << 15].into_boxed_slice();
        for (i, p) in s5_perms.iter().enumerate() {
            s5_index_of[p.code as usize] = i as u8;
        }
        let mut s5_product = vec![0u8; S5_SIZE * S5_SIZE].into_boxed_slice();
        let mut s5_inverse = [0u8; S5_SIZE];
        for (i, p) in s5_perms.iter().enumerate() {
            s5_inverse[i] = p.inverse().index() as u8;
            for (j, q) in s5_perms.iter().enumerate() {
                s5_product[i * S5_SIZE + j] = p.compose(q).index() as u8;
            }
        }

        PermTables {
            s4_perms,
            s4_index_of,
            s4_product,
            s4_inverse,
            s5_perms,
            s5_index_of,
            s5_product,
            s5_inverse,
        }
    }

    /// Table-driven composition in S₄.
    #[inline]
    pub fn compose4(&self, a: Perm4, b: Perm4) -> Perm4 {
        let ia = self.s4_index_of[a.code as usize] as usize;
        let ib = self.s4_index_of[b.code as usize] as usize;
        self.s4_perms[self.s4_product[ia][ib] as usize]
    }

    /// Table-driven inverse in S₄.
    #[inline]
    pub fn inverse4(&self, a: Perm4) -> Perm4 {
        let ia = self.s4_index_of[a.code as usize] as usize;
        self.s4_perms[self.s4_inverse[ia] as usize]
    }

    /// Table-driven composition in S₅.
    #[inline]
    pub fn compose5(&self, a: Perm5, b: Perm5) -> Perm5 {
        let ia = self.s5_index_of[a.code as usize] as usize;
        let ib = self.s5_index_of[b.code as usize] as usize;
        self.s5_perms[self.s5_product[ia * S5_SIZE + ib] as usize]
    }

    /// Table-driven inverse in S₅.
    #[inline]
    pub fn inverse5(&self, a: Perm5) -> Perm5 {
        let ia = self.s5_index_of[a.code as usize] as usize;
        self.s5_perms[self.s5_inverse[ia] as usize]
    }
}

impl Default for PermTables {
    fn default() -> Self {
        PermTables::new()
    }
}

impl fmt::Debug for PermTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermTables").finish_non_exhaustive()
    }
}
