// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Dense integer matrices and vectors.
//!
//! [`MatrixInt`] is a row-major dense matrix over [`Int`] supporting the
//! elementary row operations the engine needs, plus [`MatrixInt::row_basis`]
//! which reorders rows so that a maximal independent set comes first.
//! All reduction is done in integer arithmetic only; rows are divided by
//! their gcd as elimination proceeds to keep entries small.

use std::fmt;

use super::integer::Int;

/// A dense matrix of [`Int`] values in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatrixInt {
    rows: usize,
    cols: usize,
    dat: Vec<Int>,
}

impl MatrixInt {
    /// Create a zero matrix of the given dimensions.
    pub fn zero(rows: usize, cols: usize) -> MatrixInt {
        MatrixInt {
            rows,
            cols,
            dat: vec![Int::ZERO; rows * cols],
        }
    }

    /// Build a matrix from explicit rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows have inconsistent lengths.
    pub fn from_rows(rows: Vec<Vec<Int>>) -> MatrixInt {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut dat = Vec::with_capacity(n_rows * n_cols);
        for r in rows {
            assert_eq!(r.len(), n_cols, "ragged matrix rows");
            dat.extend(r);
        }
        MatrixInt {
            rows: n_rows,
            cols: n_cols,
            dat,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub fn entry(&self, r: usize, c: usize) -> &Int {
        &self.dat[r * self.cols + c]
    }

    pub fn entry_mut(&mut self, r: usize, c: usize) -> &mut Int {
        &mut self.dat[r * self.cols + c]
    }

    pub fn set(&mut self, r: usize, c: usize, v: Int) {
        self.dat[r * self.cols + c] = v;
    }

    /// Borrow row `r` as a slice.
    pub fn row(&self, r: usize) -> &[Int] {
        &self.dat[r * self.cols..(r + 1) * self.cols]
    }

    /// Append a row to the bottom of the matrix.
    ///
    /// # Panics
    ///
    /// Panics if the row length does not match the column count of a
    /// non-empty matrix.
    pub fn push_row(&mut self, row: Vec<Int>) {
        if self.rows == 0 && self.cols == 0 {
            self.cols = row.len();
        }
        assert_eq!(row.len(), self.cols, "row length mismatch");
        self.dat.extend(row);
        self.rows += 1;
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.cols {
            self.dat.swap(a * self.cols + c, b * self.cols + c);
        }
    }

    pub fn swap_cols(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for r in 0..self.rows {
            self.dat.swap(r * self.cols + a, r * self.cols + b);
        }
    }

    /// Multiply row `r` by `k`.
    pub fn mult_row(&mut self, r: usize, k: &Int) {
        for c in 0..self.cols {
            self.entry_mut(r, c).mul_assign(k);
        }
    }

    /// Add `k` times row `src` to row `dest`.
    pub fn add_row_multiple(&mut self, src: usize, dest: usize, k: &Int) {
        for c in 0..self.cols {
            let mut t = self.entry(src, c).clone();
            t.mul_assign(k);
            self.entry_mut(dest, c).add_assign(&t);
        }
    }

    /// Divide row `r` through by the gcd of its entries.
    pub fn reduce_row(&mut self, r: usize) {
        let mut g = Int::ZERO;
        for c in 0..self.cols {
            g.gcd_assign(self.entry(r, c));
            if g.is_one() {
                return;
            }
        }
        if !g.is_zero() && !g.is_one() {
            for c in 0..self.cols {
                self.entry_mut(r, c).div_exact_assign(&g);
            }
        }
    }

    /// The dot product of row `r` with the given vector.
    pub fn row_dot(&self, r: usize, v: &[Int]) -> Int {
        debug_assert_eq!(v.len(), self.cols);
        let mut acc = Int::ZERO;
        for c in 0..self.cols {
            let mut t = self.entry(r, c).clone();
            t.mul_assign(&v[c]);
            acc.add_assign(&t);
        }
        acc
    }

    /// Reorder the rows of this matrix so that the first `rank` rows are
    /// linearly independent, and return that rank.
    ///
    /// The elimination happens on a scratch copy; this matrix only has its
    /// rows permuted, never otherwise modified.
    pub fn row_basis(&mut self) -> usize {
        let n = self.cols;
        let mut echelon = self.clone();

        let mut done_rows = 0;
        let mut rank = echelon.rows;
        let mut lead: Vec<usize> = (0..n).collect();

        while done_rows < rank {
            // Find the first non-zero entry in the row under consideration.
            let mut found = None;
            for c in done_rows..n {
                if !echelon.entry(done_rows, lead[c]).is_zero() {
                    found = Some(c);
                    break;
                }
            }
            match found {
                None => {
                    // Zero row: push it below the independent block.
                    rank -= 1;
                    if done_rows < rank {
                        echelon.swap_rows(done_rows, rank);
                        self.swap_rows(done_rows, rank);
                    }
                }
                Some(c) => {
                    lead.swap(done_rows, c);
                    let coeff1 = echelon.entry(done_rows, lead[done_rows]).clone();
                    for r in done_rows + 1..rank {
                        let coeff2 = echelon.entry(r, lead[done_rows]).clone();
                        if !coeff2.is_zero() {
                            let mut neg = coeff2;
                            neg.negate();
                            echelon.mult_row(r, &coeff1);
                            echelon.add_row_multiple(done_rows, r, &neg);
                            echelon.reduce_row(r);
                        }
                    }
                    done_rows += 1;
                }
            }
        }
        rank
    }
}

impl fmt::Display for MatrixInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            for c in 0..self.cols {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.entry(r, c))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Divide a vector through by the gcd of its entries, in place.
///
/// The zero vector is left untouched.  Signs are preserved; the gcd used
/// is always positive.
pub fn scale_down(v: &mut [Int]) {
    let mut g = Int::ZERO;
    for x in v.iter() {
        g.gcd_assign(x);
        if g.is_one() {
            return;
        }
    }
    if g.is_zero() || g.is_one() {
        return;
    }
    for x in v.iter_mut() {
        x.div_exact_assign(&g);
    }
}

/// The dot product of two equal-length vectors.
pub fn dot(a: &[Int], b: &[Int]) -> Int {
    debug_assert_eq!(a.len(), b.len());
    let mut acc = Int::ZERO;
    for (x, y) in a.iter().zip(b) {
        let mut t = x.clone();
        t.mul_assign(y);
        acc.add_assign(&t);
    }
    acc
}
