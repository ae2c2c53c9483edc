// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Exact arithmetic and small algebraic helpers.
//!
//! Everything the enumeration engine computes with lives here: tagged
//! arbitrary-precision integers, rationals, dense integer matrices, and
//! packed permutations with their product tables.  No floating point
//! appears anywhere in this module.

pub mod integer;
pub mod matrix;
pub mod perm;
pub mod rational;

pub use integer::Int;
pub use matrix::{dot, scale_down, MatrixInt};
pub use perm::{Perm, Perm4, Perm5, PermTables};
pub use rational::Rational;
