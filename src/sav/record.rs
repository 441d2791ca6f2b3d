/// Decoded payload of one record field.
///
/// Integer scalars are widened to `i64` regardless of wire width; the schema
/// keeps the width for re-encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
	/// Integer scalar, sign- or zero-extended per its kind.
	Int(i64),
	/// Float scalar.
	Float(f32),
	/// Length-prefixed string payload.
	Str(String),
	/// Integer array elements.
	Ints(Vec<i64>),
	/// Float array elements.
	Floats(Vec<f32>),
	/// Sub-records of a vector field; the count is the length.
	Records(Vec<Record>),
	/// Captured stream position of an offset bookmark.
	Offset(u32),
	/// Placeholder for a declaration-only field.
	Hidden,
}

/// One decoded field, paired with its schema name.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
	/// Schema field name.
	pub name: &'static str,
	/// Decoded payload.
	pub slot: Slot,
}

/// A decoded record: one slot per schema field, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
	/// Schema name.
	pub name: &'static str,
	/// Slots aligned with the schema's field list.
	pub fields: Vec<RecordField>,
}

impl Record {
	/// Create a record with no fields yet.
	pub fn new(name: &'static str) -> Self {
		Self { name, fields: Vec::new() }
	}

	/// Append a slot under the given field name.
	pub fn push(&mut self, name: &'static str, slot: Slot) {
		self.fields.push(RecordField { name, slot });
	}

	/// Find a slot by field name.
	pub fn get(&self, name: &str) -> Option<&Slot> {
		self.fields.iter().find(|f| f.name == name).map(|f| &f.slot)
	}

	/// Find a slot by field name, mutably.
	pub fn get_mut(&mut self, name: &str) -> Option<&mut Slot> {
		self.fields.iter_mut().find(|f| f.name == name).map(|f| &mut f.slot)
	}

	/// Read an integer slot by name; `None` when absent or non-integer.
	pub fn int(&self, name: &str) -> Option<i64> {
		match self.get(name) {
			Some(Slot::Int(v)) => Some(*v),
			_ => None,
		}
	}
}
