// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Arbitrary-precision signed integers with a native fast path.
//!
//! [`Int`] stores small values directly as an `i64` and spills to a heap
//! [`BigInt`] only when a computation leaves the native range.  Every
//! operation re-canonicalises its result, so the `Big` variant never holds
//! a value that would fit in an `i64`; this keeps equality and ordering
//! cheap and is the invariant the whole module rests on.
//!
//! The enumeration engine performs the overwhelming majority of its
//! arithmetic on values that fit comfortably in a machine word, and only
//! rarely (on large or degenerate triangulations) needs more.  The tagged
//! representation makes the common case allocation-free.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer as NumInteger;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::error::EnumError;

/// A signed integer of unbounded magnitude with an `i64` fast path.
#[derive(Debug, Clone)]
pub enum Int {
    /// A value within the native `i64` range.
    Small(i64),
    /// A value outside the native range.  Invariant: never fits in `i64`.
    Big(BigInt),
}

impl Int {
    /// The zero value.
    pub const ZERO: Int = Int::Small(0);

    /// The one value.
    pub const ONE: Int = Int::Small(1);

    /// Wrap a `BigInt`, demoting to the native representation if it fits.
    pub fn from_big(b: BigInt) -> Int {
        match b.to_i64() {
            Some(v) => Int::Small(v),
            None => Int::Big(b),
        }
    }

    /// The value as a `BigInt`, regardless of representation.
    pub fn to_big(&self) -> BigInt {
        match self {
            Int::Small(v) => BigInt::from(*v),
            Int::Big(b) => b.clone(),
        }
    }

    /// The value as an `i64` if it fits.
    pub fn to_native(&self) -> Option<i64> {
        match self {
            Int::Small(v) => Some(*v),
            Int::Big(_) => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Int::Small(0))
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Int::Small(1))
    }

    /// Sign of the value: -1, 0 or 1.
    pub fn sign(&self) -> i8 {
        match self {
            Int::Small(v) => (*v > 0) as i8 - (*v < 0) as i8,
            Int::Big(b) => {
                if b.is_negative() {
                    -1
                } else {
                    1
                }
            }
        }
    }

    pub fn is_negative(&self) -> bool {
        self.sign() < 0
    }

    pub fn is_positive(&self) -> bool {
        self.sign() > 0
    }

    /// Negate in place.
    pub fn negate(&mut self) {
        match self {
            Int::Small(v) => match v.checked_neg() {
                Some(n) => *v = n,
                None => *self = Int::Big(-BigInt::from(*v)),
            },
            Int::Big(b) => {
                let neg = -std::mem::take(b);
                *self = Int::from_big(neg);
            }
        }
    }

    /// The absolute value.
    pub fn abs(&self) -> Int {
        if self.is_negative() {
            let mut r = self.clone();
            r.negate();
            r
        } else {
            self.clone()
        }
    }

    pub fn add_assign(&mut self, other: &Int) {
        if let (Int::Small(a), Int::Small(b)) = (&*self, other) {
            if let Some(v) = a.checked_add(*b) {
                *self = Int::Small(v);
                return;
            }
        }
        *self = Int::from_big(self.to_big() + other.to_big());
    }

    pub fn sub_assign(&mut self, other: &Int) {
        if let (Int::Small(a), Int::Small(b)) = (&*self, other) {
            if let Some(v) = a.checked_sub(*b) {
                *self = Int::Small(v);
                return;
            }
        }
        *self = Int::from_big(self.to_big() - other.to_big());
    }

    pub fn mul_assign(&mut self, other: &Int) {
        if let (Int::Small(a), Int::Small(b)) = (&*self, other) {
            if let Some(v) = a.checked_mul(*b) {
                *self = Int::Small(v);
                return;
            }
        }
        *self = Int::from_big(self.to_big() * other.to_big());
    }

    /// Divide exactly by `other`.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the division leaves a remainder.  The
    /// engine only calls this where exactness is guaranteed (integer
    /// Gaussian elimination and gcd-normalised row operations).
    pub fn div_exact_assign(&mut self, other: &Int) {
        debug_assert!(!other.is_zero());
        if let (Int::Small(a), Int::Small(b)) = (&*self, other) {
            debug_assert_eq!(a % b, 0, "inexact division {a} / {b}");
            *self = Int::Small(a / b);
            return;
        }
        let (q, r) = self.to_big().div_rem(&other.to_big());
        debug_assert!(r.is_zero(), "inexact division");
        *self = Int::from_big(q);
    }

    /// Replace this value with gcd(self, other).  The result is always
    /// non-negative, and gcd(0, 0) = 0.
    pub fn gcd_assign(&mut self, other: &Int) {
        if let (Int::Small(a), Int::Small(b)) = (&*self, other) {
            // i64 gcd overflows only for gcd(i64::MIN, 0) and friends.
            if *a != i64::MIN && *b != i64::MIN {
                *self = Int::Small(gcd_i64(*a, *b));
                return;
            }
        }
        *self = Int::from_big(self.to_big().gcd(&other.to_big()));
    }

    /// Replace this value with lcm(self, other), always non-negative.
    pub fn lcm_assign(&mut self, other: &Int) {
        if self.is_zero() || other.is_zero() {
            *self = Int::ZERO;
            return;
        }
        let mut g = self.clone();
        g.gcd_assign(other);
        let mut r = self.abs();
        r.div_exact_assign(&g);
        r.mul_assign(&other.abs());
        *self = r;
    }

    /// Number of bits in the absolute value (0 for zero).  Used by the
    /// Hadamard-style width bound.
    pub fn bits(&self) -> u64 {
        match self {
            Int::Small(v) => 64 - v.unsigned_abs().leading_zeros() as u64,
            Int::Big(b) => b.bits(),
        }
    }
}

fn gcd_i64(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Default for Int {
    fn default() -> Self {
        Int::ZERO
    }
}

impl From<i64> for Int {
    fn from(v: i64) -> Self {
        Int::Small(v)
    }
}

impl From<i32> for Int {
    fn from(v: i32) -> Self {
        Int::Small(v as i64)
    }
}

impl PartialEq for Int {
    fn eq(&self, other: &Self) -> bool {
        // Canonical form: Big never holds a native-range value.
        match (self, other) {
            (Int::Small(a), Int::Small(b)) => a == b,
            (Int::Big(a), Int::Big(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Int {}

impl PartialOrd for Int {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Int {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Int::Small(a), Int::Small(b)) => a.cmp(b),
            (Int::Big(a), Int::Big(b)) => a.cmp(b),
            (Int::Small(_), Int::Big(b)) => {
                if b.is_negative() {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (Int::Big(a), Int::Small(_)) => {
                if a.is_negative() {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
        }
    }
}

impl std::hash::Hash for Int {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Int::Small(v) => v.hash(state),
            Int::Big(b) => b.hash(state),
        }
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Int::Small(v) => write!(f, "{v}"),
            Int::Big(b) => write!(f, "{b}"),
        }
    }
}

impl FromStr for Int {
    type Err = EnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(v) = s.parse::<i64>() {
            return Ok(Int::Small(v));
        }
        let b = s
            .parse::<BigInt>()
            .map_err(|_| EnumError::InvalidInput(format!("bad integer literal: {s:?}")))?;
        Ok(Int::from_big(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_arithmetic() {
        let mut a = Int::from(6);
        a.mul_assign(&Int::from(-7));
        assert_eq!(a, Int::from(-42));
        a.add_assign(&Int::from(2));
        assert_eq!(a, Int::from(-40));
        a.div_exact_assign(&Int::from(-8));
        assert_eq!(a, Int::from(5));
    }

    #[test]
    fn test_overflow_promotes_and_demotes() {
        let mut a = Int::from(i64::MAX);
        a.add_assign(&Int::ONE);
        assert!(a.to_native().is_none());
        a.sub_assign(&Int::ONE);
        // Back in range: must demote to the native representation.
        assert_eq!(a.to_native(), Some(i64::MAX));
    }

    #[test]
    fn test_gcd_lcm() {
        let mut g = Int::from(12);
        g.gcd_assign(&Int::from(-18));
        assert_eq!(g, Int::from(6));

        let mut l = Int::from(4);
        l.lcm_assign(&Int::from(6));
        assert_eq!(l, Int::from(12));

        let mut z = Int::ZERO;
        z.gcd_assign(&Int::ZERO);
        assert_eq!(z, Int::ZERO);
    }

    #[test]
    fn test_ordering_across_representations() {
        let mut big = Int::from(i64::MAX);
        big.add_assign(&Int::ONE);
        assert!(big > Int::from(i64::MAX));
        let mut neg = Int::from(i64::MIN);
        neg.sub_assign(&Int::ONE);
        assert!(neg < Int::from(i64::MIN));
    }

    #[test]
    fn test_parse_round_trip() {
        for s in ["0", "-17", "92233720368547758079999"] {
            let v: Int = s.parse().unwrap();
            assert_eq!(v.to_string(), s);
        }
        assert!("12x".parse::<Int>().is_err());
    }

    #[test]
    fn test_sign_and_negate() {
        let mut v = Int::from(-5);
        assert_eq!(v.sign(), -1);
        v.negate();
        assert_eq!(v, Int::from(5));
        assert_eq!(Int::ZERO.sign(), 0);
    }
}
