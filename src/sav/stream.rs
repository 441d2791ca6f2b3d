//! Fixed-width primitive reads and writes over `std::io` streams.
//!
//! Everything here speaks raw `io::Result`; the codec layer attaches field
//! paths and turns short reads into typed decode errors.

use std::io::{self, Read, Write};

use crate::sav::schema::{ByteOrder, ScalarKind};

/// Read one integer scalar, widening to `i64` with the kind's signedness.
pub(crate) fn read_int<R: Read>(r: &mut R, kind: ScalarKind, order: ByteOrder) -> io::Result<i64> {
	let size = kind.size();
	let mut buf = [0u8; 8];
	r.read_exact(&mut buf[..size])?;

	let mut raw = 0u64;
	match order {
		ByteOrder::Le => {
			for i in (0..size).rev() {
				raw = raw << 8 | u64::from(buf[i]);
			}
		}
		ByteOrder::Be => {
			for i in 0..size {
				raw = raw << 8 | u64::from(buf[i]);
			}
		}
	}
	Ok(widen(kind, raw))
}

/// Sign-extend signed kinds; unsigned kinds keep their bit pattern, so a u64
/// above `i64::MAX` wraps and is recovered by masking on write.
fn widen(kind: ScalarKind, raw: u64) -> i64 {
	match kind {
		ScalarKind::S8 => i64::from(raw as u8 as i8),
		ScalarKind::S16 => i64::from(raw as u16 as i16),
		ScalarKind::S32 => i64::from(raw as u32 as i32),
		_ => raw as i64,
	}
}

/// Write one integer scalar, truncating `value` to the kind's width.
pub(crate) fn write_int<W: Write>(
	w: &mut W,
	kind: ScalarKind,
	order: ByteOrder,
	value: i64,
) -> io::Result<()> {
	let size = kind.size();
	let raw = value as u64;
	let mut buf = [0u8; 8];
	for (i, byte) in buf[..size].iter_mut().enumerate() {
		*byte = (raw >> (8 * i)) as u8;
	}
	if order == ByteOrder::Be {
		buf[..size].reverse();
	}
	w.write_all(&buf[..size])
}

/// Read one IEEE-754 single.
pub(crate) fn read_f32<R: Read>(r: &mut R, order: ByteOrder) -> io::Result<f32> {
	let bits = read_int(r, ScalarKind::U32, order)? as u32;
	Ok(f32::from_bits(bits))
}

/// Write one IEEE-754 single.
pub(crate) fn write_f32<W: Write>(w: &mut W, order: ByteOrder, value: f32) -> io::Result<()> {
	write_int(w, ScalarKind::U32, order, i64::from(value.to_bits()))
}

/// Read a u32-LE length prefix followed by that many string bytes.
///
/// Non-UTF-8 bytes are replaced; savegame strings are ASCII in practice.
pub(crate) fn read_len_string<R: Read>(r: &mut R) -> io::Result<String> {
	let len = read_int(r, ScalarKind::U32, ByteOrder::Le)? as u32 as usize;
	let mut bytes = vec![0u8; len];
	r.read_exact(&mut bytes)?;
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write a u32-LE length prefix followed by the string bytes.
pub(crate) fn write_len_string<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
	write_int(w, ScalarKind::U32, ByteOrder::Le, s.len() as i64)?;
	w.write_all(s.as_bytes())
}
