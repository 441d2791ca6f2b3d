/// Width and signedness of a binary scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
	/// Unsigned 8-bit.
	U8,
	/// Unsigned 16-bit.
	U16,
	/// Unsigned 32-bit.
	U32,
	/// Unsigned 64-bit.
	U64,
	/// Signed 8-bit.
	S8,
	/// Signed 16-bit.
	S16,
	/// Signed 32-bit.
	S32,
	/// Signed 64-bit.
	S64,
	/// IEEE-754 single precision.
	F32,
}

impl ScalarKind {
	/// Encoded size in bytes.
	pub fn size(self) -> usize {
		match self {
			Self::U8 | Self::S8 => 1,
			Self::U16 | Self::S16 => 2,
			Self::U32 | Self::S32 | Self::F32 => 4,
			Self::U64 | Self::S64 => 8,
		}
	}

	/// Whether values of this kind print as hex rather than signed decimal.
	pub fn is_unsigned(self) -> bool {
		matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
	}
}

/// Byte order of one field's encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
	/// Little-endian, the container default.
	#[default]
	Le,
	/// Big-endian.
	Be,
}

/// Wire shape of one schema field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
	/// A single scalar value.
	Scalar(ScalarKind),
	/// `len` consecutive scalars, length fixed by the schema.
	FixedArray {
		/// Element kind.
		elem: ScalarKind,
		/// Element count.
		len: usize,
	},
	/// Consecutive scalars whose count was decoded into an earlier field.
	DynArray {
		/// Element kind.
		elem: ScalarKind,
		/// Name of the earlier scalar field holding the element count.
		count_field: &'static str,
	},
	/// A count scalar followed by that many sub-records.
	Vector {
		/// Kind of the inline count scalar.
		count: ScalarKind,
		/// Exported name of the count leaf; on import the element array is
		/// authoritative and a stale count leaf is ignored.
		count_name: &'static str,
		/// Schema of each element record.
		elem: Schema,
	},
	/// u32 little-endian length prefix followed by that many string bytes.
	LenString,
	/// Stream position bookmark; carries no bytes, captured on decode and
	/// refreshed on encode.
	Offset,
	/// Declared but absent from every codec; keeps field slots aligned with
	/// the schema.
	Hidden,
}

/// One named field of a record schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
	/// Member name, used in tree export and error paths.
	pub name: &'static str,
	/// Wire shape.
	pub kind: FieldKind,
	/// Encoding byte order.
	pub order: ByteOrder,
}

impl Field {
	fn new(name: &'static str, kind: FieldKind) -> Self {
		Self { name, kind, order: ByteOrder::Le }
	}

	/// A single scalar field.
	pub fn scalar(name: &'static str, kind: ScalarKind) -> Self {
		Self::new(name, FieldKind::Scalar(kind))
	}

	/// A fixed-length scalar array field.
	pub fn fixed_array(name: &'static str, elem: ScalarKind, len: usize) -> Self {
		Self::new(name, FieldKind::FixedArray { elem, len })
	}

	/// A scalar array whose length lives in the named earlier field.
	pub fn dyn_array(name: &'static str, elem: ScalarKind, count_field: &'static str) -> Self {
		Self::new(name, FieldKind::DynArray { elem, count_field })
	}

	/// A counted list of sub-records; `count_name` names the exported count leaf.
	pub fn vector(
		name: &'static str,
		count: ScalarKind,
		count_name: &'static str,
		elem: Schema,
	) -> Self {
		Self::new(name, FieldKind::Vector { count, count_name, elem })
	}

	/// A length-prefixed string field.
	pub fn len_string(name: &'static str) -> Self {
		Self::new(name, FieldKind::LenString)
	}

	/// A stream-position bookmark field.
	pub fn offset(name: &'static str) -> Self {
		Self::new(name, FieldKind::Offset)
	}

	/// A declaration-only placeholder field.
	pub fn hidden(name: &'static str) -> Self {
		Self::new(name, FieldKind::Hidden)
	}

	/// Switch the field to big-endian encoding, builder style.
	pub fn be(mut self) -> Self {
		self.order = ByteOrder::Be;
		self
	}
}

/// An ordered record schema; field order is the wire layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
	/// Record name, used as the root of error paths.
	pub name: &'static str,
	/// Fields in declaration and wire order.
	pub fields: Vec<Field>,
}

impl Schema {
	/// Create an empty schema.
	pub fn new(name: &'static str) -> Self {
		Self { name, fields: Vec::new() }
	}

	/// Append a field, builder style.
	pub fn field(mut self, field: Field) -> Self {
		self.fields.push(field);
		self
	}

	/// Find a field by name.
	pub fn find(&self, name: &str) -> Option<&Field> {
		self.fields.iter().find(|f| f.name == name)
	}
}
