// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The persisted representation of a surface vector.
//!
//! A surface is stored as its coordinate system, its vector length, an
//! optional name, and the non-zero entries as `(index, value)` pairs in
//! decimal.  Values of any magnitude round-trip: entries beyond the
//! 64-bit range are written as arbitrary-precision decimal strings.
//!
//! ```text
//! surface quad3 6 some name
//! 2 2
//! 3 1
//! end
//! ```
//!
//! Loading is strict: an unknown coordinate system, a malformed count or
//! value, an index at or beyond the stated length, or a repeated index
//! all invalidate the record.

use crate::coords::NormalCoords;
use crate::error::{EnumError, Result};
use crate::maths::Int;

use super::SurfaceVector;

/// Serialise a surface with the given name.
///
/// The name must not contain a newline; it is stored to the end of the
/// header line.
pub fn write_surface(surface: &SurfaceVector, name: &str) -> String {
    debug_assert!(!name.contains('\n'));
    let mut out = String::new();
    out.push_str("surface ");
    out.push_str(surface.coords.id());
    out.push(' ');
    out.push_str(&surface.values.len().to_string());
    if !name.is_empty() {
        out.push(' ');
        out.push_str(name);
    }
    out.push('\n');
    for (i, v) in surface.values.iter().enumerate() {
        if !v.is_zero() {
            out.push_str(&format!("{i} {v}\n"));
        }
    }
    out.push_str("end\n");
    out
}

fn invalid(msg: impl Into<String>) -> EnumError {
    EnumError::InvalidInput(msg.into())
}

/// Parse a surface serialised by [`write_surface`].
///
/// Returns the surface together with its stored name.
pub fn read_surface(text: &str) -> Result<(SurfaceVector, String)> {
    let mut lines = text.lines();
    let header = lines.next().ok_or_else(|| invalid("empty surface record"))?;

    let rest = header
        .strip_prefix("surface ")
        .ok_or_else(|| invalid("missing surface header"))?;
    let mut parts = rest.splitn(3, ' ');
    let coords = parts
        .next()
        .and_then(NormalCoords::from_id)
        .ok_or_else(|| invalid("unknown coordinate system"))?;
    let length: usize = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| invalid("malformed vector length"))?;
    let name = parts.next().unwrap_or("").to_string();

    let mut values = vec![Int::ZERO; length];
    let mut seen = vec![false; length];
    let mut terminated = false;
    for line in lines.by_ref() {
        if line == "end" {
            terminated = true;
            break;
        }
        let (index, value) = line
            .split_once(' ')
            .ok_or_else(|| invalid(format!("malformed entry: {line:?}")))?;
        let index: usize = index
            .parse()
            .map_err(|_| invalid(format!("malformed index: {index:?}")))?;
        if index >= length {
            return Err(invalid(format!("index {index} out of range 0..{length}")));
        }
        if seen[index] {
            return Err(invalid(format!("duplicate index {index}")));
        }
        seen[index] = true;
        values[index] = value.parse()?;
    }
    if !terminated {
        return Err(invalid("missing end marker"));
    }

    Ok((SurfaceVector { coords, values }, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(coords: NormalCoords, xs: &[i64]) -> SurfaceVector {
        SurfaceVector {
            coords,
            values: xs.iter().map(|&x| Int::from(x)).collect(),
        }
    }

    #[test]
    fn test_round_trip() {
        let s = surface(NormalCoords::Quad3, &[0, 0, 2, 1, 0, 0]);
        let text = write_surface(&s, "a quad surface");
        let (back, name) = read_surface(&text).unwrap();
        assert_eq!(back.coords, s.coords);
        assert_eq!(back.values, s.values);
        assert_eq!(name, "a quad surface");
    }

    #[test]
    fn test_round_trip_empty_name_and_zero_vector() {
        let s = surface(NormalCoords::Std3, &[0; 7]);
        let (back, name) = read_surface(&write_surface(&s, "")).unwrap();
        assert_eq!(back.values, s.values);
        assert_eq!(name, "");
    }

    #[test]
    fn test_round_trip_big_values() {
        let mut s = surface(NormalCoords::Quad3, &[0, 1, 0]);
        let mut big = Int::from(i64::MAX);
        big.mul_assign(&Int::from(i64::MAX));
        s.values[1] = big.clone();
        let (back, _) = read_surface(&write_surface(&s, "big")).unwrap();
        assert_eq!(back.values[1], big);
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let text = "surface quad3 3\n5 1\nend\n";
        assert!(matches!(
            read_surface(text).unwrap_err(),
            EnumError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_rejects_duplicate_index() {
        let text = "surface quad3 3\n1 1\n1 2\nend\n";
        assert!(matches!(
            read_surface(text).unwrap_err(),
            EnumError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_rejects_unknown_system_and_garbage() {
        assert!(read_surface("surface wibble 3\nend\n").is_err());
        assert!(read_surface("surface quad3 x\nend\n").is_err());
        assert!(read_surface("surface quad3 3\n1 1\n").is_err());
        assert!(read_surface("").is_err());
        assert!(read_surface("surface quad3 3\n1 banana\nend\n").is_err());
    }
}
