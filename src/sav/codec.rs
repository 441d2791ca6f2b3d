//! Operations derived from a record schema.
//!
//! One field list drives five mutually consistent codecs: binary decode and
//! encode, tree export and import, and a diagnostic dump. Field paths in
//! errors are dotted and indexed, e.g. `header.mods[2].name`.

use std::fmt::Write as _;
use std::io::{self, Read, Seek, Write};

use crate::sav::error::{DecodeReason, ImportReason, Result, SavError};
use crate::sav::record::{Record, Slot};
use crate::sav::schema::{ByteOrder, Field, FieldKind, ScalarKind, Schema};
use crate::sav::stream;
use crate::sav::value::{Node, NodeKind};

impl Schema {
	/// Decode one record from the stream, fixed layout, declaration order.
	///
	/// No partial record escapes a failed decode.
	pub fn decode<R: Read + Seek>(&self, r: &mut R) -> Result<Record> {
		decode_record(self, r, self.name)
	}

	/// Encode one record; `Offset` slots are refreshed from the live write
	/// position, which is why the record is mutable.
	pub fn encode<W: Write + Seek>(&self, rec: &mut Record, w: &mut W) -> Result<()> {
		encode_record(self, rec, w, self.name)
	}

	/// Export the record as an unnamed map node, one member per visible field.
	pub fn export(&self, rec: &Record) -> Node {
		export_record(self, rec)
	}

	/// Import a record from a map node; offsets become placeholders to be
	/// recomputed at encode time.
	pub fn import(&self, node: &Node) -> Result<Record> {
		import_record(self, node, self.name)
	}

	/// Append a diagnostic dump of the record, 2 spaces per indent level.
	pub fn dump(&self, rec: &Record, out: &mut String, indent: usize) {
		dump_record(self, rec, out, indent);
	}
}

fn decode_err(path: &str, reason: DecodeReason) -> SavError {
	SavError::Decode { path: path.to_owned(), reason }
}

fn import_err(path: &str, reason: ImportReason) -> SavError {
	SavError::Import { path: path.to_owned(), reason }
}

/// Short reads become typed truncation errors; other IO failures pass through.
fn read_err(err: io::Error, path: &str) -> SavError {
	if err.kind() == io::ErrorKind::UnexpectedEof {
		decode_err(path, DecodeReason::Truncated)
	} else {
		SavError::Io(err)
	}
}

fn checked_count(value: i64, path: &str) -> Result<usize> {
	usize::try_from(value).map_err(|_| decode_err(path, DecodeReason::OutOfRange))
}

// Binary decode

fn decode_record<R: Read + Seek>(schema: &Schema, r: &mut R, path: &str) -> Result<Record> {
	let mut rec = Record::new(schema.name);
	for field in &schema.fields {
		let fpath = format!("{path}.{}", field.name);
		let slot = decode_field(field, &rec, r, &fpath)?;
		rec.push(field.name, slot);
	}
	Ok(rec)
}

fn decode_field<R: Read + Seek>(
	field: &Field,
	rec: &Record,
	r: &mut R,
	fpath: &str,
) -> Result<Slot> {
	match &field.kind {
		FieldKind::Scalar(ScalarKind::F32) => {
			let v = stream::read_f32(r, field.order).map_err(|e| read_err(e, fpath))?;
			Ok(Slot::Float(v))
		}
		FieldKind::Scalar(kind) => {
			let v = stream::read_int(r, *kind, field.order).map_err(|e| read_err(e, fpath))?;
			Ok(Slot::Int(v))
		}
		FieldKind::FixedArray { elem, len } => {
			decode_scalars(r, *elem, field.order, *len, fpath)
		}
		FieldKind::DynArray { elem, count_field } => {
			let count = rec
				.int(count_field)
				.ok_or_else(|| decode_err(fpath, DecodeReason::OutOfRange))?;
			let len = checked_count(count, fpath)?;
			decode_scalars(r, *elem, field.order, len, fpath)
		}
		FieldKind::Vector { count, elem, .. } => {
			let n = stream::read_int(r, *count, field.order).map_err(|e| read_err(e, fpath))?;
			let len = checked_count(n, fpath)?;
			let mut records = Vec::with_capacity(len.min(4096));
			for i in 0..len {
				records.push(decode_record(elem, r, &format!("{fpath}[{i}]"))?);
			}
			Ok(Slot::Records(records))
		}
		FieldKind::LenString => {
			let s = stream::read_len_string(r).map_err(|e| read_err(e, fpath))?;
			Ok(Slot::Str(s))
		}
		FieldKind::Offset => {
			let pos = r.stream_position()?;
			Ok(Slot::Offset(pos as u32))
		}
		FieldKind::Hidden => Ok(Slot::Hidden),
	}
}

fn decode_scalars<R: Read>(
	r: &mut R,
	elem: ScalarKind,
	order: ByteOrder,
	len: usize,
	fpath: &str,
) -> Result<Slot> {
	if elem == ScalarKind::F32 {
		let mut out = Vec::with_capacity(len);
		for _ in 0..len {
			out.push(stream::read_f32(r, order).map_err(|e| read_err(e, fpath))?);
		}
		Ok(Slot::Floats(out))
	} else {
		let mut out = Vec::with_capacity(len);
		for _ in 0..len {
			out.push(stream::read_int(r, elem, order).map_err(|e| read_err(e, fpath))?);
		}
		Ok(Slot::Ints(out))
	}
}

// Binary encode

fn encode_record<W: Write + Seek>(
	schema: &Schema,
	rec: &mut Record,
	w: &mut W,
	path: &str,
) -> Result<()> {
	for field in &schema.fields {
		let fpath = format!("{path}.{}", field.name);
		// Dynamic-array lengths come from a sibling slot, read before the
		// mutable field borrow below.
		let dyn_len = match &field.kind {
			FieldKind::DynArray { count_field, .. } => {
				let count = rec
					.int(count_field)
					.ok_or_else(|| import_err(&fpath, ImportReason::MissingField))?;
				Some(checked_count(count, &fpath)?)
			}
			_ => None,
		};

		let order = field.order;
		let slot = rec
			.get_mut(field.name)
			.ok_or_else(|| import_err(&fpath, ImportReason::MissingField))?;
		match (&field.kind, slot) {
			(FieldKind::Scalar(ScalarKind::F32), Slot::Float(v)) => {
				stream::write_f32(w, order, *v)?;
			}
			(FieldKind::Scalar(kind), Slot::Int(v)) => {
				stream::write_int(w, *kind, order, *v)?;
			}
			(FieldKind::FixedArray { elem, len }, slot) => {
				encode_scalars(w, *elem, order, *len, slot, &fpath)?;
			}
			(FieldKind::DynArray { elem, .. }, slot) => {
				// Extra elements beyond the count are dropped, short slots
				// are zero-filled.
				let len = dyn_len.unwrap_or(0);
				encode_scalars(w, *elem, order, len, slot, &fpath)?;
			}
			(FieldKind::Vector { count, elem, .. }, Slot::Records(records)) => {
				stream::write_int(w, *count, order, records.len() as i64)?;
				for (i, el) in records.iter_mut().enumerate() {
					encode_record(elem, el, w, &format!("{fpath}[{i}]"))?;
				}
			}
			(FieldKind::LenString, Slot::Str(s)) => {
				stream::write_len_string(w, s)?;
			}
			(FieldKind::Offset, slot) => {
				*slot = Slot::Offset(w.stream_position()? as u32);
			}
			(FieldKind::Hidden, _) => {}
			_ => return Err(import_err(&fpath, ImportReason::TypeMismatch)),
		}
	}
	Ok(())
}

fn encode_scalars<W: Write>(
	w: &mut W,
	elem: ScalarKind,
	order: ByteOrder,
	len: usize,
	slot: &Slot,
	fpath: &str,
) -> Result<()> {
	match (elem, slot) {
		(ScalarKind::F32, Slot::Floats(vs)) => {
			for i in 0..len {
				stream::write_f32(w, order, vs.get(i).copied().unwrap_or(0.0))?;
			}
		}
		(_, Slot::Ints(vs)) if elem != ScalarKind::F32 => {
			for i in 0..len {
				stream::write_int(w, elem, order, vs.get(i).copied().unwrap_or(0))?;
			}
		}
		_ => return Err(import_err(fpath, ImportReason::TypeMismatch)),
	}
	Ok(())
}

// Tree export

fn export_record(schema: &Schema, rec: &Record) -> Node {
	let mut map = Node::map(None);
	for field in &schema.fields {
		let name = field.name;
		match (&field.kind, rec.get(name)) {
			(FieldKind::Scalar(kind), Some(Slot::Int(v))) => {
				map.push_child(int_leaf(Some(name), *kind, *v));
			}
			(FieldKind::Scalar(ScalarKind::F32), Some(Slot::Float(v))) => {
				map.push_child(Node::float(Some(name), *v));
			}
			(
				FieldKind::FixedArray { elem, .. } | FieldKind::DynArray { elem, .. },
				Some(Slot::Ints(vs)),
			) => {
				let mut arr = Node::array(Some(name));
				for v in vs {
					arr.push_child(int_leaf(None, *elem, *v));
				}
				map.push_child(arr);
			}
			(
				FieldKind::FixedArray { .. } | FieldKind::DynArray { .. },
				Some(Slot::Floats(vs)),
			) => {
				let mut arr = Node::array(Some(name));
				for v in vs {
					arr.push_child(Node::float(None, *v));
				}
				map.push_child(arr);
			}
			(FieldKind::Vector { count, count_name, elem }, Some(Slot::Records(records))) => {
				map.push_child(int_leaf(Some(count_name), *count, records.len() as i64));
				let mut arr = Node::array(Some(name));
				for el in records {
					arr.push_child(export_record(elem, el));
				}
				map.push_child(arr);
			}
			(FieldKind::LenString, Some(Slot::Str(s))) => {
				map.push_child(Node::string(Some(name), Some(s)));
			}
			// Offsets and hidden fields never reach the tree.
			_ => {}
		}
	}
	map
}

fn int_leaf(name: Option<&str>, kind: ScalarKind, v: i64) -> Node {
	match kind {
		ScalarKind::U64 | ScalarKind::S64 => Node::int64(name, v),
		_ => Node::int(name, v as i32),
	}
}

// Tree import

fn import_record(schema: &Schema, node: &Node, path: &str) -> Result<Record> {
	let mut rec = Record::new(schema.name);
	for field in &schema.fields {
		let fpath = format!("{path}.{}", field.name);
		let slot = import_field(field, &rec, node, &fpath)?;
		rec.push(field.name, slot);
	}
	Ok(rec)
}

fn import_field(field: &Field, rec: &Record, node: &Node, fpath: &str) -> Result<Slot> {
	match &field.kind {
		FieldKind::Scalar(ScalarKind::F32) => {
			Ok(Slot::Float(coerce_f32(require(node, field.name, fpath)?, fpath)?))
		}
		FieldKind::Scalar(_) => {
			Ok(Slot::Int(coerce_int(require(node, field.name, fpath)?, fpath)?))
		}
		FieldKind::FixedArray { elem, len } => {
			import_scalars(require(node, field.name, fpath)?, *elem, *len, fpath)
		}
		FieldKind::DynArray { elem, count_field } => {
			let count = rec
				.int(count_field)
				.ok_or_else(|| import_err(fpath, ImportReason::MissingField))?;
			let len = usize::try_from(count)
				.map_err(|_| import_err(fpath, ImportReason::TypeMismatch))?;
			import_scalars(require(node, field.name, fpath)?, *elem, len, fpath)
		}
		FieldKind::Vector { elem, .. } => {
			// The element array is authoritative, a stale count leaf in the
			// file is ignored.
			let arr = require(node, field.name, fpath)?;
			if !arr.kind.is_container() {
				return Err(import_err(fpath, ImportReason::TypeMismatch));
			}
			let mut records = Vec::with_capacity(arr.child_count());
			for (i, child) in arr.children.iter().enumerate() {
				let epath = format!("{fpath}[{i}]");
				if !child.kind.is_container() {
					return Err(import_err(&epath, ImportReason::TypeMismatch));
				}
				records.push(import_record(elem, child, &epath)?);
			}
			Ok(Slot::Records(records))
		}
		FieldKind::LenString => {
			let child = require(node, field.name, fpath)?;
			match &child.kind {
				// A hand-written null is an alias for the empty string.
				NodeKind::Str(s) => Ok(Slot::Str(s.clone().unwrap_or_default())),
				_ => Err(import_err(fpath, ImportReason::TypeMismatch)),
			}
		}
		FieldKind::Offset => Ok(Slot::Offset(0)),
		FieldKind::Hidden => Ok(Slot::Hidden),
	}
}

fn require<'a>(node: &'a Node, name: &str, fpath: &str) -> Result<&'a Node> {
	node.child(name).ok_or_else(|| import_err(fpath, ImportReason::MissingField))
}

fn coerce_int(node: &Node, fpath: &str) -> Result<i64> {
	match node.kind {
		NodeKind::I32(_) | NodeKind::I64(_) => Ok(node.as_i64()),
		NodeKind::F32(v) => Ok(v as i64),
		_ => Err(import_err(fpath, ImportReason::TypeMismatch)),
	}
}

fn coerce_f32(node: &Node, fpath: &str) -> Result<f32> {
	match node.kind {
		NodeKind::F32(v) => Ok(v),
		NodeKind::I32(_) | NodeKind::I64(_) => Ok(node.as_i64() as f32),
		_ => Err(import_err(fpath, ImportReason::TypeMismatch)),
	}
}

fn import_scalars(arr: &Node, elem: ScalarKind, len: usize, fpath: &str) -> Result<Slot> {
	if !arr.kind.is_container() {
		return Err(import_err(fpath, ImportReason::TypeMismatch));
	}
	// Positional assignment, zero-filled when the tree is shorter than the
	// declared length; extra children are ignored.
	if elem == ScalarKind::F32 {
		let mut out = vec![0.0f32; len];
		for (dst, child) in out.iter_mut().zip(&arr.children) {
			*dst = coerce_f32(child, fpath)?;
		}
		Ok(Slot::Floats(out))
	} else {
		let mut out = vec![0i64; len];
		for (dst, child) in out.iter_mut().zip(&arr.children) {
			*dst = coerce_int(child, fpath)?;
		}
		Ok(Slot::Ints(out))
	}
}

// Diagnostic dump

fn dump_record(schema: &Schema, rec: &Record, out: &mut String, indent: usize) {
	let pad = indent * 2;
	for field in &schema.fields {
		let name = field.name;
		match (&field.kind, rec.get(name)) {
			(FieldKind::Scalar(kind), Some(Slot::Int(v))) => {
				let _ = writeln!(out, "{:pad$}{name}: {}", "", fmt_scalar(*kind, *v));
			}
			(FieldKind::Scalar(ScalarKind::F32), Some(Slot::Float(v))) => {
				let _ = writeln!(out, "{:pad$}{name}: {v:?}", "");
			}
			(
				FieldKind::FixedArray { elem, .. } | FieldKind::DynArray { elem, .. },
				Some(Slot::Ints(vs)),
			) => {
				for (i, v) in vs.iter().enumerate() {
					let _ = writeln!(out, "{:pad$}{name}{i}: {}", "", fmt_scalar(*elem, *v));
				}
			}
			(
				FieldKind::FixedArray { .. } | FieldKind::DynArray { .. },
				Some(Slot::Floats(vs)),
			) => {
				for (i, v) in vs.iter().enumerate() {
					let _ = writeln!(out, "{:pad$}{name}{i}: {v:?}", "");
				}
			}
			(FieldKind::Vector { count, count_name, elem }, Some(Slot::Records(records))) => {
				let _ = writeln!(
					out,
					"{:pad$}{count_name}: {}",
					"",
					fmt_scalar(*count, records.len() as i64)
				);
				let _ = writeln!(out, "{:pad$}{name}:", "");
				for el in records {
					dump_record(elem, el, out, indent + 1);
				}
			}
			(FieldKind::LenString, Some(Slot::Str(s))) => {
				let _ = writeln!(out, "{:pad$}{name}: ({}) {s}", "", s.len());
			}
			(FieldKind::Offset, Some(Slot::Offset(pos))) => {
				let _ = writeln!(out, "{:pad$}{name}: 0x{pos:08X}", "");
			}
			_ => {}
		}
	}
}

/// Unsigned scalars print as width-padded hex, signed as decimal.
fn fmt_scalar(kind: ScalarKind, v: i64) -> String {
	match kind {
		ScalarKind::U8 => format!("0x{:02X}", v as u8),
		ScalarKind::U16 => format!("0x{:04X}", v as u16),
		ScalarKind::U32 => format!("0x{:08X}", v as u32),
		ScalarKind::U64 => format!("0x{:016X}", v as u64),
		_ => format!("{v}"),
	}
}
