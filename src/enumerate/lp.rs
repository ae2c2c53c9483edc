// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The rational-pivot LP tableau driving the tree traversal.
//!
//! The tableau here is specialised to the matching equation system.  An
//! [`LpInitialTableaux`] is built once per search: it reorders the rows of
//! the matching matrix to a full-rank prefix, permutes the columns by a
//! heuristic that keeps structurally related tetrahedra together, and
//! stores the matrix column by column in sparse form.  Each node of the
//! search tree then works with an [`LpData`], which never stores the
//! tableau itself, only the right-hand side and a matrix of row
//! operations.  Tableau entries are recomputed on demand by multiplying a
//! row of the row-operation matrix against a sparse column, which is what
//! makes [`LpData::init_clone`] cheap enough to call at every branch.
//!
//! Octagon coordinates never appear explicitly: an octagon is a pair of
//! quadrilateral columns constrained to be equal and positive
//! ([`LpData::constrain_oct`]), with the column merge applied lazily
//! inside the entry computation.
//!
//! All arithmetic is generic over [`LpInt`].  The native widths use
//! checked operations and report [`EnumError::Overflow`], which the
//! enumeration entry points catch and retry one width up.

use smallvec::SmallVec;

use crate::coords::{NormalCoords, QUAD_MEETING, QUAD_SEPARATING};
use crate::error::{EnumError, Result};
use crate::maths::{matrix, Int, MatrixInt, Rational};
use crate::triangulation::Triangulation3;

/// Integer arithmetic as required by the LP tableau.
///
/// The native implementations (`i64`, `i128`) use checked arithmetic and
/// surface overflow as an error; [`Int`] never fails.
pub trait LpInt: Clone + Default + PartialEq + Eq + PartialOrd + Ord + std::fmt::Debug {
    fn from_i64(v: i64) -> Self;

    /// Conversion from an arbitrary-precision value, failing on overflow.
    fn from_int(v: &Int) -> Result<Self>;

    fn is_zero(&self) -> bool;

    fn sign(&self) -> i8;

    fn negate(&mut self);

    fn add_assign(&mut self, other: &Self) -> Result<()>;

    fn sub_assign(&mut self, other: &Self) -> Result<()>;

    fn mul_assign(&mut self, other: &Self) -> Result<()>;

    /// Exact division; the caller guarantees divisibility.
    fn div_exact_assign(&mut self, other: &Self);

    /// Replace with gcd(self, other), always non-negative.
    fn gcd_assign(&mut self, other: &Self);

    /// The value widened to an [`Int`], for solution extraction.
    fn to_int(&self) -> Int;
}

macro_rules! native_lp_int {
    ($t:ty) => {
        impl LpInt for $t {
            fn from_i64(v: i64) -> Self {
                v as $t
            }

            fn from_int(v: &Int) -> Result<Self> {
                match v.to_native() {
                    Some(n) => Ok(n as $t),
                    None => Err(EnumError::Overflow),
                }
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }

            fn sign(&self) -> i8 {
                (*self > 0) as i8 - (*self < 0) as i8
            }

            fn negate(&mut self) {
                *self = -*self;
            }

            fn add_assign(&mut self, other: &Self) -> Result<()> {
                *self = self.checked_add(*other).ok_or(EnumError::Overflow)?;
                Ok(())
            }

            fn sub_assign(&mut self, other: &Self) -> Result<()> {
                *self = self.checked_sub(*other).ok_or(EnumError::Overflow)?;
                Ok(())
            }

            fn mul_assign(&mut self, other: &Self) -> Result<()> {
                *self = self.checked_mul(*other).ok_or(EnumError::Overflow)?;
                Ok(())
            }

            fn div_exact_assign(&mut self, other: &Self) {
                debug_assert!(*other != 0 && *self % *other == 0);
                *self /= *other;
            }

            fn gcd_assign(&mut self, other: &Self) {
                let (mut a, mut b) = (self.unsigned_abs(), other.unsigned_abs());
                while b != 0 {
                    let t = a % b;
                    a = b;
                    b = t;
                }
                *self = a as $t;
            }

            fn to_int(&self) -> Int {
                if let Ok(v) = i64::try_from(*self) {
                    Int::from(v)
                } else {
                    Int::from_big((*self).into())
                }
            }
        }
    };
}

native_lp_int!(i64);
native_lp_int!(i128);

impl LpInt for Int {
    fn from_i64(v: i64) -> Self {
        Int::from(v)
    }

    fn from_int(v: &Int) -> Result<Self> {
        Ok(v.clone())
    }

    fn is_zero(&self) -> bool {
        Int::is_zero(self)
    }

    fn sign(&self) -> i8 {
        Int::sign(self)
    }

    fn negate(&mut self) {
        Int::negate(self);
    }

    fn add_assign(&mut self, other: &Self) -> Result<()> {
        Int::add_assign(self, other);
        Ok(())
    }

    fn sub_assign(&mut self, other: &Self) -> Result<()> {
        Int::sub_assign(self, other);
        Ok(())
    }

    fn mul_assign(&mut self, other: &Self) -> Result<()> {
        Int::mul_assign(self, other);
        Ok(())
    }

    fn div_exact_assign(&mut self, other: &Self) {
        Int::div_exact_assign(self, other);
    }

    fn gcd_assign(&mut self, other: &Self) {
        Int::gcd_assign(self, other);
    }

    fn to_int(&self) -> Int {
        self.clone()
    }
}

/// The integer widths an LP run can use, narrowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LpWidth {
    I64,
    I128,
    Arbitrary,
}

impl LpWidth {
    /// The next width up, for the overflow-retry loop.
    pub fn widen(self) -> LpWidth {
        match self {
            LpWidth::I64 => LpWidth::I128,
            _ => LpWidth::Arbitrary,
        }
    }
}

/// Choose the narrowest provably safe integer width for the given
/// matching matrix.
///
/// The bound multiplies a Hadamard-style estimate of the largest
/// subdeterminant (product of row Euclidean norms, taken over the rows in
/// bits) by the largest column sum of absolute values, doubled when
/// octagons may merge two columns into one.
pub fn select_width(eqns: &MatrixInt, almost_normal: bool) -> LpWidth {
    let mut det_bits: u64 = 0;
    for r in 0..eqns.rows() {
        let mut norm_sq = Int::ZERO;
        for c in 0..eqns.cols() {
            let mut sq = eqns.entry(r, c).clone();
            sq.mul_assign(eqns.entry(r, c));
            norm_sq.add_assign(&sq);
        }
        det_bits += norm_sq.bits() / 2 + 1;
    }

    let mut max_col_sum = Int::ZERO;
    for c in 0..eqns.cols() {
        let mut sum = Int::ZERO;
        for r in 0..eqns.rows() {
            sum.add_assign(&eqns.entry(r, c).abs());
        }
        if sum > max_col_sum {
            max_col_sum = sum;
        }
    }
    let col_bits = max_col_sum.bits() + if almost_normal { 1 } else { 0 };

    // A couple of bits of slack for the rhs updates during pivoting.
    let bits = det_bits + col_bits + 2;
    if bits <= 62 {
        LpWidth::I64
    } else if bits <= 126 {
        LpWidth::I128
    } else {
        LpWidth::Arbitrary
    }
}

/// A dense matrix for the LP row operations.
///
/// Storage is reserved once, up front; [`LpMatrix::init_identity`] and
/// [`LpMatrix::init_clone`] then re-initialise in place without
/// reallocating.  This matters because the tree search re-initialises
/// pool tableaux at every node.
#[derive(Debug, Clone)]
pub struct LpMatrix<T> {
    dat: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: LpInt> LpMatrix<T> {
    /// Reserve storage for a matrix of at most `max_rows * max_cols`
    /// elements.  The matrix is unusable until one of the `init_`
    /// routines is called.
    pub fn reserved(max_rows: usize, max_cols: usize) -> LpMatrix<T> {
        LpMatrix {
            dat: vec![T::default(); max_rows * max_cols],
            rows: 0,
            cols: 0,
        }
    }

    /// Re-initialise as a zero matrix of the given size.
    pub fn init_zero(&mut self, rows: usize, cols: usize) {
        debug_assert!(rows * cols <= self.dat.len());
        self.rows = rows;
        self.cols = cols;
        for v in self.dat[..rows * cols].iter_mut() {
            *v = T::default();
        }
    }

    /// Re-initialise as the identity matrix of the given size.
    pub fn init_identity(&mut self, size: usize) {
        debug_assert!(size * size <= self.dat.len());
        self.rows = size;
        self.cols = size;
        for r in 0..size {
            for c in 0..size {
                self.dat[r * size + c] = T::from_i64((r == c) as i64);
            }
        }
    }

    /// Re-initialise as a copy of the given matrix.
    pub fn init_clone(&mut self, other: &LpMatrix<T>) {
        debug_assert!(other.rows * other.cols <= self.dat.len());
        self.rows = other.rows;
        self.cols = other.cols;
        let n = other.rows * other.cols;
        self.dat[..n].clone_from_slice(&other.dat[..n]);
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn entry(&self, r: usize, c: usize) -> &T {
        &self.dat[r * self.cols + c]
    }

    #[inline]
    pub fn entry_mut(&mut self, r: usize, c: usize) -> &mut T {
        &mut self.dat[r * self.cols + c]
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.cols {
            self.dat.swap(a * self.cols + c, b * self.cols + c);
        }
    }

    pub fn negate_row(&mut self, r: usize) {
        for c in 0..self.cols {
            self.entry_mut(r, c).negate();
        }
    }

    /// Split out mutable access to row `dest` alongside shared access to
    /// row `src`.
    fn two_rows(&mut self, dest: usize, src: usize) -> (&mut [T], &[T]) {
        debug_assert_ne!(dest, src);
        let w = self.cols;
        if dest < src {
            let (lo, hi) = self.dat.split_at_mut(src * w);
            (&mut lo[dest * w..dest * w + w], &hi[..w])
        } else {
            let (lo, hi) = self.dat.split_at_mut(dest * w);
            (&mut hi[..w], &lo[src * w..src * w + w])
        }
    }

    /// Replace row `dest` with `(dest_coeff * dest - src_coeff * src) / div`,
    /// where the division is known to be exact.
    pub fn comb_row(
        &mut self,
        dest_coeff: &T,
        dest: usize,
        src_coeff: &T,
        src: usize,
        div: &T,
    ) -> Result<()> {
        let (pd, ps) = self.two_rows(dest, src);
        for (d, s) in pd.iter_mut().zip(ps) {
            d.mul_assign(dest_coeff)?;
            let mut t = src_coeff.clone();
            t.mul_assign(s)?;
            d.sub_assign(&t)?;
            d.div_exact_assign(div);
        }
        Ok(())
    }

    /// As [`comb_row`](Self::comb_row) without the division, then divide
    /// the result through by its gcd.  Returns that gcd (zero if the row
    /// came out all zero).
    pub fn comb_row_and_norm(
        &mut self,
        dest_coeff: &T,
        dest: usize,
        src_coeff: &T,
        src: usize,
    ) -> Result<T> {
        let (pd, ps) = self.two_rows(dest, src);
        let mut gcd = T::default();
        let one = T::from_i64(1);
        for (d, s) in pd.iter_mut().zip(ps) {
            d.mul_assign(dest_coeff)?;
            let mut t = src_coeff.clone();
            t.mul_assign(s)?;
            d.sub_assign(&t)?;
            if gcd != one {
                gcd.gcd_assign(d);
            }
        }
        if !gcd.is_zero() && gcd != one {
            for c in 0..self.cols {
                self.entry_mut(dest, c).div_exact_assign(&gcd);
            }
        }
        Ok(gcd)
    }
}

/// One column of the adjusted matching matrix, in sparse form.
///
/// Entries of magnitude greater than one are stored as repeated rows.
/// `extra` holds this column's coefficient in each additional constraint
/// row.
#[derive(Debug, Clone, Default)]
struct LpCol {
    plus: SmallVec<[u32; 4]>,
    minus: SmallVec<[u32; 4]>,
    extra: SmallVec<[i64; 2]>,
}

impl LpCol {
    fn push(&mut self, row: usize, value: &Int) {
        let v = value.to_native().expect("matching equation entries are small");
        for _ in 0..v.unsigned_abs() {
            if v > 0 {
                self.plus.push(row as u32);
            } else {
                self.minus.push(row as u32);
            }
        }
    }
}

/// How an additional constraint row is enforced once a feasible basis is
/// found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraEnforce {
    /// The row's slack variable is constrained to be at least one.
    Positive,
    /// The row's slack variable is pinned to zero.
    Zero,
}

/// A family of additional linear constraint rows for the tableau.
///
/// Each constraint contributes one row (over the coordinate columns) and
/// one slack column whose value equals the row's dot product with the
/// solution; [`ExtraConstraint::enforce`] says what to do with that slack.
pub trait ExtraConstraint {
    /// One coefficient vector per constraint row, over the unpermuted
    /// coordinate columns of the LP system.
    fn rows(&self, tri: &Triangulation3, coords: NormalCoords) -> Vec<Vec<i64>>;

    /// How each constraint row's slack variable is enforced.
    fn enforce(&self) -> Vec<ExtraEnforce>;

    /// The adjustment added to each merged quad column's coefficient when
    /// the pair becomes an octagon.
    fn oct_adjustment(&self) -> i64 {
        0
    }

    /// Whether this constraint can be expressed in the given system.
    fn supported(&self, coords: NormalCoords) -> bool;
}

/// Constrains the Euler characteristic of the solution to be positive.
///
/// The constraint row carries, per disc type, that type's contribution to
/// the Euler characteristic of the surface: each disc counts one face,
/// each arc class (one per triangle of the triangulation) subtracts an
/// edge, and each intersection with an edge of the triangulation adds a
/// vertex.
pub struct EulerPositive;

impl ExtraConstraint for EulerPositive {
    fn rows(&self, tri: &Triangulation3, coords: NormalCoords) -> Vec<Vec<i64>> {
        debug_assert!(self.supported(coords));
        let n = tri.size();
        let mut obj = vec![1i64; 7 * n];
        for triangle in tri.triangles() {
            let emb = &triangle.embeddings[0];
            let w = emb.perm.image(3);
            for i in 0..3 {
                let v = emb.perm.image(i);
                obj[7 * emb.tet + v] -= 1;
                obj[7 * emb.tet + 4 + QUAD_SEPARATING[v][w]] -= 1;
            }
        }
        for edge in tri.edges() {
            let emb = &edge.embeddings[0];
            let a = emb.perm.image(0);
            let b = emb.perm.image(1);
            obj[7 * emb.tet + a] += 1;
            obj[7 * emb.tet + b] += 1;
            for &q in &QUAD_MEETING[a][b] {
                obj[7 * emb.tet + 4 + q] += 1;
            }
        }
        vec![obj]
    }

    fn enforce(&self) -> Vec<ExtraEnforce> {
        vec![ExtraEnforce::Positive]
    }

    // An octagon has Euler characteristic one where the two quads it
    // replaces had two; spreading -1 across each merged column keeps the
    // slack equal to chi.  The further -1 makes the tracked quantity
    // chi - #octagons, so "positive" still means chi > 0 on octagon
    // solutions.
    fn oct_adjustment(&self) -> i64 {
        -1
    }

    fn supported(&self, coords: NormalCoords) -> bool {
        coords.stores_triangles() && !coords.is_dim4()
    }
}

/// The layout of the LP system: quadrilateral columns only, or
/// quadrilaterals followed by triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpSystem {
    Quad,
    Standard,
}

impl LpSystem {
    pub fn for_coords(coords: NormalCoords) -> LpSystem {
        if coords.stores_triangles() {
            LpSystem::Standard
        } else {
            LpSystem::Quad
        }
    }

    /// Coordinate columns over `n` tetrahedra.
    pub fn coords(self, n_tets: usize) -> usize {
        match self {
            LpSystem::Quad => 3 * n_tets,
            LpSystem::Standard => 7 * n_tets,
        }
    }
}

/// The preprocessed starting tableau shared by every node of a search.
///
/// Columns are permuted so that the tree search decides quadrilaterals
/// tetrahedron by tetrahedron in an order that touches as few matching
/// equations as possible at a time; `column_perm` maps permuted column
/// indices back to the original coordinate positions.
pub struct LpInitialTableaux {
    system: LpSystem,
    n_tets: usize,
    eqns: MatrixInt,
    rank: usize,
    cols: usize,
    col: Vec<LpCol>,
    column_perm: Vec<usize>,
    n_extra: usize,
    enforce: Vec<ExtraEnforce>,
    oct_adjustment: i64,
}

impl LpInitialTableaux {
    /// Build the starting tableau for the given triangulation and
    /// coordinate system.
    ///
    /// Almost normal systems use the same tableau as their normal
    /// counterparts: octagons are created later by merging quad columns.
    /// `enumeration` selects the column ordering heuristic (vertex
    /// enumeration in standard coordinates mirrors the quad ordering).
    pub fn new(
        tri: &Triangulation3,
        coords: NormalCoords,
        extra: Option<&dyn ExtraConstraint>,
        enumeration: bool,
    ) -> Result<LpInitialTableaux> {
        let system = LpSystem::for_coords(coords);
        let lp_coords = match system {
            LpSystem::Quad => NormalCoords::Quad3,
            LpSystem::Standard => NormalCoords::Std3,
        };
        let mut eqns = crate::coords::matching::matching_equations(tri, lp_coords, None)?;
        let rank = eqns.row_basis();

        let n_extra = extra.map_or(0, |e| e.enforce().len());
        let coord_cols = eqns.cols();
        let cols = coord_cols + n_extra;

        let mut tab = LpInitialTableaux {
            system,
            n_tets: tri.size(),
            eqns,
            rank,
            cols,
            col: vec![LpCol::default(); cols],
            column_perm: vec![0; cols],
            n_extra,
            enforce: extra.map_or_else(Vec::new, |e| e.enforce()),
            oct_adjustment: extra.map_or(0, |e| e.oct_adjustment()),
        };
        tab.reorder(tri, enumeration);

        // Fill the sparse columns from the full-rank row prefix.
        for c in 0..coord_cols {
            for r in 0..tab.rank {
                let v = tab.eqns.entry(r, c).clone();
                if !v.is_zero() {
                    tab.col[c].push(r, &v);
                }
            }
        }

        // Additional constraint rows sit below the matching equations.
        if let Some(extra) = extra {
            let rows = extra.rows(tri, coords);
            debug_assert_eq!(rows.len(), n_extra);
            for c in 0..coord_cols {
                for row in &rows {
                    tab.col[c].extra.push(row[tab.column_perm[c]]);
                }
            }
            for (i, c) in (coord_cols..cols).enumerate() {
                for j in 0..n_extra {
                    tab.col[c].extra.push(if i == j { -1 } else { 0 });
                }
            }
            tab.rank += n_extra;
        }
        Ok(tab)
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn columns(&self) -> usize {
        self.cols
    }

    /// Coordinate columns, excluding the slack columns of any additional
    /// constraints.
    pub fn coordinate_columns(&self) -> usize {
        self.cols - self.n_extra
    }

    pub fn n_tets(&self) -> usize {
        self.n_tets
    }

    pub fn system(&self) -> LpSystem {
        self.system
    }

    /// The original coordinate position of each permuted column.
    pub fn column_perm(&self) -> &[usize] {
        &self.column_perm
    }

    /// The matching matrix, for the width-selection bound.
    pub fn eqns(&self) -> &MatrixInt {
        &self.eqns
    }

    /// Choose a column permutation and apply it to the matrix.
    ///
    /// Quadrilateral columns come first (three per tetrahedron), then for
    /// standard systems all triangle columns.  Tetrahedra are ordered by a
    /// greedy sweep that repeatedly picks the unprocessed matching
    /// equation touching the fewest new tetrahedra; the columns of the
    /// tetrahedra it touches are placed at the back of the matrix, so the
    /// search (which works from the back) decides tightly coupled
    /// tetrahedra together.  Vertex enumeration in standard coordinates
    /// reuses the ordering computed for the quad system so that the two
    /// enumerations make compatible branching decisions.
    fn reorder(&mut self, tri: &Triangulation3, enumeration: bool) {
        let n = self.n_tets;
        let coord_cols = self.eqns.cols();

        if self.system == LpSystem::Standard && enumeration {
            let quad = LpInitialTableaux::new(tri, NormalCoords::Quad3, None, true)
                .expect("quad tableau for a valid standard tableau");
            for i in 0..n {
                let k = quad.column_perm[3 * i] / 3;
                for j in 0..3 {
                    self.column_perm[3 * i + j] = 7 * k + 4 + j;
                }
                for j in 0..4 {
                    self.column_perm[3 * n + 4 * i + j] = 7 * k + j;
                }
            }
        } else {
            // Greedy fewest-new-tetrahedra sweep over the matching rows.
            let system = self.system;
            let rank = self.rank;
            let eqns = &self.eqns;
            let perm = &mut self.column_perm;

            let quad_block = move |t: usize| match system {
                LpSystem::Quad => 3 * t,
                LpSystem::Standard => 7 * t + 4,
            };
            let touches = |row: usize, t: usize| {
                (0..3).any(|j| !eqns.entry(row, quad_block(t) + j).is_zero())
            };
            let place = |perm: &mut [usize], k: usize, n_touched: usize| match system {
                LpSystem::Quad => {
                    for j in 0..3 {
                        perm[3 * (n - n_touched) + j] = 3 * k + j;
                    }
                }
                LpSystem::Standard => {
                    for j in 0..3 {
                        perm[3 * (n - n_touched) + j] = 7 * k + 4 + j;
                    }
                    for j in 0..4 {
                        perm[3 * n + 4 * (n - n_touched) + j] = 7 * k + j;
                    }
                }
            };

            let mut used = vec![false; rank];
            let mut touched = vec![false; n];
            let mut n_touched = 0;

            for _ in 0..rank {
                let mut best_row = None;
                let mut best = n + 1;
                for j in 0..rank {
                    if used[j] {
                        continue;
                    }
                    let mut curr = 0;
                    for (k, &done) in touched.iter().enumerate() {
                        if !done && touches(j, k) {
                            curr += 1;
                            if curr >= best {
                                break;
                            }
                        }
                    }
                    if curr < best {
                        best_row = Some(j);
                        best = curr;
                    }
                }
                let Some(row) = best_row else { break };
                used[row] = true;
                for k in 0..n {
                    if !touched[k] && touches(row, k) {
                        touched[k] = true;
                        n_touched += 1;
                        place(perm, k, n_touched);
                    }
                }
            }

            // Tetrahedra untouched by any equation.
            for k in 0..n {
                if !touched[k] {
                    touched[k] = true;
                    n_touched += 1;
                    place(perm, k, n_touched);
                }
            }
        }

        // Move the matrix columns to match, fixing up the permutation's
        // links as each column lands in place.
        let mut tmp: Vec<usize> = self.column_perm[..coord_cols].to_vec();
        for i in 0..coord_cols {
            if tmp[i] == i {
                continue;
            }
            self.eqns.swap_cols(i, tmp[i]);
            for j in i + 1..coord_cols {
                if tmp[j] == i {
                    tmp[j] = tmp[i];
                    break;
                }
            }
            tmp[i] = i;
        }

        for i in 0..self.n_extra {
            self.column_perm[self.cols - i - 1] = self.cols - i - 1;
        }
    }

    /// Multiply row `m_row` of the row-operation matrix by the sparse
    /// column `col` of this tableau.
    fn mult_col_by_row<T: LpInt>(&self, m: &LpMatrix<T>, m_row: usize, col: usize) -> Result<T> {
        let mut ans = T::default();
        for &r in &self.col[col].plus {
            ans.add_assign(m.entry(m_row, r as usize))?;
        }
        for &r in &self.col[col].minus {
            ans.sub_assign(m.entry(m_row, r as usize))?;
        }
        for (i, &coeff) in self.col[col].extra.iter().enumerate() {
            let mut t = m.entry(m_row, m.rows() - self.n_extra + i).clone();
            t.mul_assign(&T::from_i64(coeff))?;
            ans.add_assign(&t)?;
        }
        Ok(ans)
    }

    /// As [`mult_col_by_row`](Self::mult_col_by_row), with the octagon
    /// adjustment applied to the additional-constraint coefficients.
    fn mult_col_by_row_oct<T: LpInt>(
        &self,
        m: &LpMatrix<T>,
        m_row: usize,
        col: usize,
    ) -> Result<T> {
        let mut ans = T::default();
        for &r in &self.col[col].plus {
            ans.add_assign(m.entry(m_row, r as usize))?;
        }
        for &r in &self.col[col].minus {
            ans.sub_assign(m.entry(m_row, r as usize))?;
        }
        for (i, &coeff) in self.col[col].extra.iter().enumerate() {
            let mut t = m.entry(m_row, m.rows() - self.n_extra + i).clone();
            t.mul_assign(&T::from_i64(coeff + self.oct_adjustment))?;
            ans.add_assign(&t)?;
        }
        Ok(ans)
    }

    /// Write the full starting tableau into the given dense matrix.
    fn fill_initial_tableaux<T: LpInt>(&self, m: &mut LpMatrix<T>) -> Result<()> {
        for c in 0..self.cols {
            let one = T::from_i64(1);
            for &r in &self.col[c].plus {
                m.entry_mut(r as usize, c).add_assign(&one)?;
            }
            for &r in &self.col[c].minus {
                m.entry_mut(r as usize, c).sub_assign(&one)?;
            }
            for (i, &coeff) in self.col[c].extra.iter().enumerate() {
                *m.entry_mut(self.rank - self.n_extra + i, c) = T::from_i64(coeff);
            }
        }
        Ok(())
    }
}

/// Whether a column is currently active, and if so whether it is basic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColState {
    NonBasic,
    Basic(u32),
    Inactive,
}

/// The per-node LP state: a right-hand side and a row-operation matrix
/// over the shared starting tableau.
///
/// Every method that reads tableau entries takes the starting tableau as
/// an argument; an `LpData` holds no reference of its own, which lets the
/// search keep a pool of them alongside the tableau in one place.
pub struct LpData<T> {
    rhs: Vec<T>,
    row_ops: LpMatrix<T>,
    rank: usize,
    basis: Vec<usize>,
    col_state: Vec<ColState>,
    feasible: bool,
    /// When octagons are in play: (primary, secondary) merged columns.
    oct: Option<(usize, usize)>,
}

impl<T: LpInt> LpData<T> {
    /// Reserve storage suitable for the given tableau.  The result is
    /// unusable until [`init_start`](Self::init_start) or
    /// [`init_clone`](Self::init_clone) is called.
    pub fn reserved(tab: &LpInitialTableaux) -> LpData<T> {
        LpData {
            rhs: vec![T::default(); tab.rank()],
            row_ops: LpMatrix::reserved(tab.rank(), tab.rank()),
            rank: 0,
            basis: vec![0; tab.rank()],
            col_state: vec![ColState::NonBasic; tab.columns()],
            feasible: false,
            oct: None,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    fn is_active(&self, pos: usize) -> bool {
        self.col_state[pos] != ColState::Inactive
    }

    fn basis_row(&self, pos: usize) -> Option<usize> {
        match self.col_state[pos] {
            ColState::Basic(r) => Some(r as usize),
            _ => None,
        }
    }

    /// The tableau entry at the given row and column.
    fn entry(&self, tab: &LpInitialTableaux, row: usize, col: usize) -> Result<T> {
        match self.oct {
            Some((primary, secondary)) if primary == col => {
                let mut ans = tab.mult_col_by_row_oct(&self.row_ops, row, col)?;
                let other = tab.mult_col_by_row_oct(&self.row_ops, row, secondary)?;
                ans.add_assign(&other)?;
                Ok(ans)
            }
            _ => tab.mult_col_by_row(&self.row_ops, row, col),
        }
    }

    fn entry_sign(&self, tab: &LpInitialTableaux, row: usize, col: usize) -> Result<i8> {
        Ok(self.entry(tab, row, col)?.sign())
    }

    /// Initialise at the root: find a feasible basis for the original
    /// tableau with zero right-hand side, then enforce any additional
    /// constraints.
    pub fn init_start(&mut self, tab: &LpInitialTableaux) -> Result<()> {
        self.row_ops.init_identity(tab.rank());
        for v in self.rhs.iter_mut() {
            *v = T::default();
        }
        self.rank = tab.rank();
        self.oct = None;

        self.find_initial_basis(tab)?;

        // With a zero right-hand side any basis is feasible.
        self.feasible = true;

        for (i, enforce) in tab.enforce.iter().enumerate() {
            let col = tab.columns() - tab.n_extra + i;
            match enforce {
                ExtraEnforce::Positive => self.constrain_positive(tab, col)?,
                ExtraEnforce::Zero => self.constrain_zero(tab, col)?,
            }
        }
        Ok(())
    }

    /// Initialise as a copy of the given tableau state.
    pub fn init_clone(&mut self, parent: &LpData<T>) {
        self.feasible = parent.feasible;
        if !self.feasible {
            return;
        }
        self.rhs[..parent.rank].clone_from_slice(&parent.rhs[..parent.rank]);
        self.row_ops.init_clone(&parent.row_ops);
        self.rank = parent.rank;
        self.basis[..parent.rank].copy_from_slice(&parent.basis[..parent.rank]);
        self.col_state.copy_from_slice(&parent.col_state);
        self.oct = parent.oct;
    }

    /// Gauss-Jordan elimination to an initial basis.
    ///
    /// Intermediate values here have no useful magnitude bound, so the
    /// elimination always runs in arbitrary precision regardless of the
    /// tableau's own integer type.
    fn find_initial_basis(&mut self, tab: &LpInitialTableaux) -> Result<()> {
        for s in self.col_state.iter_mut() {
            *s = ColState::NonBasic;
        }

        let rank = self.rank;
        let cols = tab.columns();
        let mut dense: LpMatrix<Int> = LpMatrix::reserved(rank, cols);
        dense.init_zero(rank, cols);
        tab.fill_initial_tableaux(&mut dense)?;

        let mut ops: LpMatrix<Int> = LpMatrix::reserved(rank, rank);
        ops.init_identity(rank);

        for row in 0..rank {
            // The first unused non-zero entry becomes the basic variable
            // for this row; the row-reordering of the matching matrix
            // guarantees one exists.
            let mut chosen = None;
            for c in 0..cols {
                if self.col_state[c] == ColState::NonBasic && !dense.entry(row, c).is_zero() {
                    chosen = Some(c);
                    break;
                }
            }
            let c = chosen.expect("starting tableau has full rank");

            self.basis[row] = c;
            self.col_state[c] = ColState::Basic(row as u32);

            let mut base = dense.entry(row, c).clone();
            if base.is_negative() {
                base.negate();
                dense.negate_row(row);
                ops.negate_row(row);
            }

            for r in 0..rank {
                if r == row {
                    continue;
                }
                let coeff = dense.entry(r, c).clone();
                if !coeff.is_zero() {
                    let gcd = ops.comb_row_and_norm(&base, r, &coeff, row)?;
                    dense.comb_row(&base, r, &coeff, row, &gcd)?;
                }
            }
        }

        // Narrow the finished row-operation matrix to the working width.
        self.row_ops.init_identity(rank);
        for r in 0..rank {
            for c in 0..rank {
                *self.row_ops.entry_mut(r, c) = T::from_int(ops.entry(r, c))?;
            }
        }
        Ok(())
    }

    /// Pivot the variable `out_col` out of the basis and `in_col` in.
    fn pivot(&mut self, tab: &LpInitialTableaux, out_col: usize, in_col: usize) -> Result<()> {
        let def_row = self
            .basis_row(out_col)
            .expect("pivot source must be basic");
        self.col_state[out_col] = ColState::NonBasic;
        self.col_state[in_col] = ColState::Basic(def_row as u32);
        self.basis[def_row] = in_col;

        let mut base = self.entry(tab, def_row, in_col)?;
        if base.sign() < 0 {
            base.negate();
            self.rhs[def_row].negate();
            self.row_ops.negate_row(def_row);
        }

        for r in 0..self.rank {
            if r == def_row {
                continue;
            }
            let mut coeff = self.entry(tab, r, in_col)?;
            if !coeff.is_zero() {
                let gcd = self.row_ops.comb_row_and_norm(&base, r, &coeff, def_row)?;
                // The same combination applies to the right-hand side,
                // where the gcd is again known to divide exactly.
                self.rhs[r].mul_assign(&base)?;
                coeff.mul_assign(&self.rhs[def_row])?;
                self.rhs[r].sub_assign(&coeff)?;
                self.rhs[r].div_exact_assign(&gcd);
            }
        }
        Ok(())
    }

    /// Pin variable `pos` to zero and deactivate its column.
    pub fn constrain_zero(&mut self, tab: &LpInitialTableaux, pos: usize) -> Result<()> {
        if !self.is_active(pos) || !self.feasible {
            return Ok(());
        }

        let mut perhaps_infeasible = false;
        if let Some(r) = self.basis_row(pos) {
            if self.rhs[r].is_zero() {
                // Pivot in any other variable appearing in this row,
                // preferring the largest index.
                let mut chosen = None;
                for c in (0..tab.columns()).rev() {
                    if self.col_state[c] == ColState::NonBasic
                        && self.entry_sign(tab, r, c)? != 0
                    {
                        chosen = Some(c);
                        break;
                    }
                }
                match chosen {
                    // With rhs zero this pivot cannot break feasibility.
                    Some(c) => self.pivot(tab, pos, c)?,
                    None => {
                        // The equation reads x_pos = 0 outright: drop the
                        // row and lose a unit of rank.
                        self.rank -= 1;
                        let last = self.rank;
                        if r != last {
                            self.rhs.swap(r, last);
                            self.row_ops.swap_rows(r, last);
                            self.basis[r] = self.basis[last];
                            self.col_state[self.basis[r]] = ColState::Basic(r as u32);
                        }
                        self.col_state[pos] = ColState::Inactive;
                        return Ok(());
                    }
                }
            } else {
                // rhs positive: only a positive-coefficient variable can
                // replace pos without an immediate sign problem.
                let mut chosen = None;
                for c in (0..tab.columns()).rev() {
                    if self.col_state[c] == ColState::NonBasic
                        && self.entry_sign(tab, r, c)? > 0
                    {
                        chosen = Some(c);
                        break;
                    }
                }
                let Some(c) = chosen else {
                    self.feasible = false;
                    return Ok(());
                };
                self.pivot(tab, pos, c)?;
                perhaps_infeasible = true;
            }
        }

        self.col_state[pos] = ColState::Inactive;
        if perhaps_infeasible {
            self.make_feasible(tab)?;
        }
        Ok(())
    }

    /// Require variable `pos` to be at least one, by substituting
    /// `x = x' + 1` (subtract column `pos` from the right-hand side).
    pub fn constrain_positive(&mut self, tab: &LpInitialTableaux, pos: usize) -> Result<()> {
        if !self.is_active(pos) {
            self.feasible = false;
            return Ok(());
        }
        if !self.feasible {
            return Ok(());
        }

        if let Some(r) = self.basis_row(pos) {
            // A basic column has a single non-zero entry.
            let t = self.entry(tab, r, pos)?;
            self.rhs[r].sub_assign(&t)?;
            if self.rhs[r].sign() < 0 {
                self.make_feasible(tab)?;
            }
        } else {
            for r in 0..self.rank {
                let t = self.entry(tab, r, pos)?;
                self.rhs[r].sub_assign(&t)?;
            }
            self.make_feasible(tab)?;
        }
        Ok(())
    }

    /// Merge the two quad columns into a single octagon variable: their
    /// values become equal and at least one.
    pub fn constrain_oct(&mut self, tab: &LpInitialTableaux, quad1: usize, quad2: usize) -> Result<()> {
        if !(self.is_active(quad1) && self.is_active(quad2)) {
            self.feasible = false;
            return Ok(());
        }
        if !self.feasible {
            return Ok(());
        }
        debug_assert!(self.oct.is_none(), "one octagon per tableau");

        let row1 = self.basis_row(quad1);
        let row2 = self.basis_row(quad2);

        match (row1, row2) {
            (None, None) => {
                // Count octagons on quad1; quad2 is non-basic (hence
                // zero) and can simply be deactivated.
                self.oct = Some((quad1, quad2));
                self.col_state[quad2] = ColState::Inactive;
                self.constrain_positive(tab, quad1)?;
            }
            (None, Some(_)) => {
                self.oct = Some((quad1, quad2));
                self.constrain_zero(tab, quad2)?;
                self.constrain_positive(tab, quad1)?;
            }
            (Some(_), None) => {
                self.oct = Some((quad2, quad1));
                self.constrain_zero(tab, quad1)?;
                self.constrain_positive(tab, quad2)?;
            }
            (Some(r1), Some(_)) => {
                // Both basic.  After the merge, column quad1 may look
                // like anything; repair it into a basis column again.
                self.oct = Some((quad1, quad2));

                let mut e1 = self.entry(tab, r1, quad1)?;
                if !e1.is_zero() {
                    if e1.sign() < 0 {
                        e1.negate();
                        self.rhs[r1].negate();
                        self.row_ops.negate_row(r1);
                    }
                    for r in 0..self.rank {
                        if r == r1 {
                            continue;
                        }
                        let mut coeff = self.entry(tab, r, quad1)?;
                        if !coeff.is_zero() {
                            let gcd =
                                self.row_ops.comb_row_and_norm(&e1, r, &coeff, r1)?;
                            self.rhs[r].mul_assign(&e1)?;
                            coeff.mul_assign(&self.rhs[r1])?;
                            self.rhs[r].sub_assign(&coeff)?;
                            self.rhs[r].div_exact_assign(&gcd);
                        }
                    }
                    self.make_feasible(tab)?;
                    self.constrain_zero(tab, quad2)?;
                    self.constrain_positive(tab, quad1)?;
                } else {
                    // The merged column vanished at its own basis row;
                    // pull quad1 out of the basis first.
                    let mut chosen = None;
                    for c in (0..tab.columns()).rev() {
                        if self.col_state[c] == ColState::NonBasic
                            && self.entry_sign(tab, r1, c)? != 0
                        {
                            chosen = Some(c);
                            break;
                        }
                    }
                    if let Some(c) = chosen {
                        self.pivot(tab, quad1, c)?;
                        self.make_feasible(tab)?;
                        self.constrain_zero(tab, quad2)?;
                        self.constrain_positive(tab, quad1)?;
                    } else if self.rhs[r1].sign() != 0 {
                        // A zero row equated to a non-zero value.
                        self.feasible = false;
                    } else {
                        self.col_state[quad1] = ColState::NonBasic;
                        self.rank -= 1;
                        let last = self.rank;
                        if r1 != last {
                            self.rhs.swap(r1, last);
                            self.row_ops.swap_rows(r1, last);
                            self.basis[r1] = self.basis[last];
                            self.col_state[self.basis[r1]] = ColState::Basic(r1 as u32);
                        }
                        self.constrain_zero(tab, quad2)?;
                        self.constrain_positive(tab, quad1)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Dual simplex pivots until the right-hand side is non-negative or
    /// the system is found infeasible.
    ///
    /// Pivot rows are chosen by most-negative value, which is fast but
    /// can cycle; Brent's algorithm watches for a repeated basis, and on
    /// detection the remainder of the run switches to the slower
    /// largest-index rule, which cannot cycle.
    pub fn make_feasible(&mut self, tab: &LpInitialTableaux) -> Result<()> {
        use crate::bitmask::{Bitmask, HeapBitmask};

        let n_cols = tab.columns();
        let mut curr_basis = HeapBitmask::with_len(n_cols);
        for r in 0..self.rank {
            curr_basis.set(self.basis[r], true);
        }
        let mut old_basis = curr_basis.clone();
        let mut pow2: u64 = 1;
        let mut n_pivots: u64 = 0;

        loop {
            // The exiting variable: most negative, scaled by the basis
            // coefficients so the comparison is exact.
            let mut out: Option<(usize, usize, T)> = None;
            for r in 0..self.rank {
                if self.rhs[r].sign() < 0 {
                    match &out {
                        None => {
                            let e = self.entry(tab, r, self.basis[r])?;
                            out = Some((r, self.basis[r], e));
                        }
                        Some((out_row, _, out_entry)) => {
                            let e = self.entry(tab, r, self.basis[r])?;
                            let mut v1 = self.rhs[r].clone();
                            v1.mul_assign(out_entry)?;
                            let mut v2 = self.rhs[*out_row].clone();
                            v2.mul_assign(&e)?;
                            if v1 < v2 {
                                out = Some((r, self.basis[r], e));
                            }
                        }
                    }
                }
            }
            let Some((out_row, out_col, _)) = out else {
                return Ok(());
            };

            // The entering variable: largest index with a negative
            // coefficient in the exiting row.
            let mut chosen = None;
            for c in (0..n_cols).rev() {
                if self.col_state[c] == ColState::NonBasic
                    && self.entry_sign(tab, out_row, c)? < 0
                {
                    chosen = Some(c);
                    break;
                }
            }
            let Some(c) = chosen else {
                self.feasible = false;
                return Ok(());
            };
            self.pivot(tab, out_col, c)?;

            curr_basis.set(out_col, false);
            curr_basis.set(c, true);
            if curr_basis == old_basis {
                return self.make_feasible_anti_cycling(tab);
            }
            n_pivots += 1;
            if n_pivots == pow2 {
                old_basis = curr_basis.clone();
                pow2 <<= 1;
            }
        }
    }

    /// Bland-style dual simplex: largest-index exiting variable, immune
    /// to cycling.
    fn make_feasible_anti_cycling(&mut self, tab: &LpInitialTableaux) -> Result<()> {
        loop {
            let mut out_col = None;
            for r in 0..self.rank {
                if self.rhs[r].sign() < 0 {
                    out_col = match out_col {
                        Some(c) if c > self.basis[r] => Some(c),
                        _ => Some(self.basis[r]),
                    };
                }
            }
            let Some(out_col) = out_col else {
                return Ok(());
            };
            let out_row = self.basis_row(out_col).expect("exiting variable is basic");

            let mut chosen = None;
            for c in (0..tab.columns()).rev() {
                if self.col_state[c] == ColState::NonBasic
                    && self.entry_sign(tab, out_row, c)? < 0
                {
                    chosen = Some(c);
                    break;
                }
            }
            let Some(c) = chosen else {
                self.feasible = false;
                return Ok(());
            };
            self.pivot(tab, out_col, c)?;
        }
    }

    /// Read back a primitive integer solution vector.
    ///
    /// `type_vec` supplies the discrete decisions of the search node so
    /// that the substitutions made by
    /// [`constrain_positive`](Self::constrain_positive) and
    /// [`constrain_oct`](Self::constrain_oct) can be undone.  Extraction
    /// always runs in arbitrary precision; the scaled values can exceed
    /// the tableau's own width.
    pub fn extract_solution(&self, tab: &LpInitialTableaux, type_vec: &[u8]) -> Vec<Int> {
        debug_assert!(self.feasible);

        let coord_cols = tab.coordinate_columns();
        let perm = tab.column_perm();

        // Each basic variable's value as a rational; the lcm of the
        // denominators is the scale clearing them all at once.
        let mut ratios = Vec::with_capacity(self.rank);
        let mut lcm = Int::ONE;
        for i in 0..self.rank {
            let e = self
                .entry(tab, i, self.basis[i])
                .expect("arbitrary precision extraction")
                .to_int();
            let r = Rational::new(self.rhs[i].to_int(), e);
            lcm.lcm_assign(r.denominator());
            ratios.push(r);
        }

        let mut v = vec![Int::ZERO; coord_cols];
        for (i, r) in ratios.iter().enumerate() {
            if self.basis[i] >= coord_cols {
                continue;
            }
            v[perm[self.basis[i]]] = r.scaled_to_int(&lcm);
        }

        // Undo the `x -> x + 1` substitutions recorded in the type vector.
        let n_tets = tab.n_tets();
        for (i, &t) in type_vec.iter().take(n_tets).enumerate() {
            if (1..=3).contains(&t) {
                v[perm[3 * i + (t - 1) as usize]].add_assign(&lcm);
            }
        }
        if tab.system() == LpSystem::Standard {
            for i in 3 * n_tets..coord_cols {
                if type_vec[i - 2 * n_tets] != 0 {
                    v[perm[i]].add_assign(&lcm);
                }
            }
        }
        if let Some((primary, secondary)) = self.oct {
            v[perm[primary]].add_assign(&lcm);
            v[perm[secondary]] = v[perm[primary]].clone();
        }

        matrix::scale_down(&mut v);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangulation::sample;

    fn quad_tableau(tri: &Triangulation3) -> LpInitialTableaux {
        LpInitialTableaux::new(tri, NormalCoords::Quad3, None, true).unwrap()
    }

    #[test]
    fn test_width_selection_small_system() {
        let tri = sample::figure_eight();
        let tab = quad_tableau(&tri);
        assert_eq!(select_width(tab.eqns(), false), LpWidth::I64);
    }

    #[test]
    fn test_width_widen_chain() {
        assert_eq!(LpWidth::I64.widen(), LpWidth::I128);
        assert_eq!(LpWidth::I128.widen(), LpWidth::Arbitrary);
        assert_eq!(LpWidth::Arbitrary.widen(), LpWidth::Arbitrary);
    }

    #[test]
    fn test_column_perm_is_a_permutation() {
        let tri = sample::figure_eight();
        for coords in [NormalCoords::Quad3, NormalCoords::Std3] {
            let tab = LpInitialTableaux::new(&tri, coords, None, true).unwrap();
            let mut seen = vec![false; tab.columns()];
            for &p in tab.column_perm() {
                assert!(!seen[p]);
                seen[p] = true;
            }
            assert!(seen.iter().all(|&s| s));
        }
    }

    #[test]
    fn test_standard_perm_puts_quads_first() {
        let tri = sample::figure_eight();
        let tab = LpInitialTableaux::new(&tri, NormalCoords::Std3, None, true).unwrap();
        let n = tri.size();
        for c in 0..3 * n {
            assert!(tab.column_perm()[c] % 7 >= 4, "quad columns lead");
        }
        for c in 3 * n..7 * n {
            assert!(tab.column_perm()[c] % 7 < 4, "triangle columns trail");
        }
    }

    #[test]
    fn test_root_tableau_is_feasible() {
        let tri = sample::figure_eight();
        let tab = quad_tableau(&tri);
        let mut lp: LpData<i64> = LpData::reserved(&tab);
        lp.init_start(&tab).unwrap();
        assert!(lp.is_feasible());
    }

    #[test]
    fn test_all_quads_zero_is_feasible_and_zero() {
        // Constraining every variable to zero keeps the zero solution.
        let tri = sample::figure_eight();
        let tab = quad_tableau(&tri);
        let mut lp: LpData<i64> = LpData::reserved(&tab);
        lp.init_start(&tab).unwrap();
        for c in 0..tab.columns() {
            lp.constrain_zero(&tab, c).unwrap();
        }
        assert!(lp.is_feasible());
    }

    #[test]
    fn test_known_ray_is_feasible() {
        // Figure-eight: (0, 0, 2, 1, 0, 0) is a vertex ray, so requiring
        // q02 and q10 positive with the rest zero must stay feasible.
        let tri = sample::figure_eight();
        let tab = quad_tableau(&tri);
        let perm = tab.column_perm().to_vec();
        let col_of = |orig: usize| perm.iter().position(|&p| p == orig).unwrap();

        let mut lp: LpData<i64> = LpData::reserved(&tab);
        lp.init_start(&tab).unwrap();
        for orig in [0, 1, 4, 5] {
            lp.constrain_zero(&tab, col_of(orig)).unwrap();
        }
        lp.constrain_positive(&tab, col_of(2)).unwrap();
        lp.constrain_positive(&tab, col_of(3)).unwrap();
        assert!(lp.is_feasible());

        let type_vec = vec![0u8; tri.size()];
        let v = lp.extract_solution(&tab, &type_vec);
        // The extracted solution lies on the ray, with the substituted
        // +1 offsets folded back in by the type vector in the real
        // search; here both constrained coordinates stay positive.
        assert!(!v[2].is_zero() && !v[3].is_zero());
    }

    #[test]
    fn test_incompatible_quads_infeasible() {
        // One-tetrahedron sphere: only the third quad type supports a
        // surface, so requiring the first to be positive fails.
        let tri = sample::s3_one_tet();
        let tab = quad_tableau(&tri);
        let perm = tab.column_perm().to_vec();
        let col_of = |orig: usize| perm.iter().position(|&p| p == orig).unwrap();

        let mut lp: LpData<i64> = LpData::reserved(&tab);
        lp.init_start(&tab).unwrap();
        lp.constrain_positive(&tab, col_of(0)).unwrap();
        lp.constrain_zero(&tab, col_of(1)).unwrap();
        lp.constrain_zero(&tab, col_of(2)).unwrap();
        assert!(!lp.is_feasible());
    }

    #[test]
    fn test_clone_diverges_from_parent() {
        let tri = sample::figure_eight();
        let tab = quad_tableau(&tri);
        let mut root: LpData<i64> = LpData::reserved(&tab);
        root.init_start(&tab).unwrap();

        let mut child: LpData<i64> = LpData::reserved(&tab);
        child.init_clone(&root);
        child.constrain_zero(&tab, 0).unwrap();
        child.constrain_positive(&tab, 1).unwrap();

        // The parent is untouched and still at the root state.
        assert!(root.is_feasible());
        assert!(root.is_active(0));
        assert!(!child.is_active(0));
    }

    #[test]
    fn test_euler_coefficients_ball() {
        // In a lone tetrahedron every disc is just a disc: each column's
        // Euler contribution is one.
        let tri = sample::ball();
        let rows = EulerPositive.rows(&tri, NormalCoords::Std3);
        assert_eq!(rows, vec![vec![1; 7]]);
    }

    #[test]
    fn test_euler_coefficients_vertex_link() {
        // The vertex links of the one-tetrahedron sphere are spheres:
        // summing coefficients over each link's triangles gives two.
        let tri = sample::s3_one_tet();
        let rows = EulerPositive.rows(&tri, NormalCoords::Std3);
        let obj = &rows[0];
        for vtx in 0..tri.vertices().len() {
            let chi: i64 = tri.vertices()[vtx]
                .embeddings
                .iter()
                .map(|e| obj[7 * e.tet + e.vertex])
                .sum();
            assert_eq!(chi, 2);
        }
    }

    #[test]
    fn test_native_overflow_reported() {
        let mut v = i64::MAX;
        assert_eq!(
            LpInt::add_assign(&mut v, &1).unwrap_err(),
            EnumError::Overflow
        );
        let mut w: i128 = i128::MAX;
        assert_eq!(
            LpInt::mul_assign(&mut w, &2).unwrap_err(),
            EnumError::Overflow
        );
        let mut big = Int::from(i64::MAX);
        assert!(LpInt::mul_assign(&mut big, &Int::from(i64::MAX)).is_ok());
    }
}
