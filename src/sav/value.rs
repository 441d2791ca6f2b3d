/// Rendering hint for numeric leaves.
///
/// Purely presentational: it changes how the writer prints a value, never the
/// value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumStyle {
	/// Signed decimal.
	#[default]
	Decimal,
	/// Zero-padded uppercase hex, 2 digits.
	Hex8,
	/// Zero-padded uppercase hex, 4 digits.
	Hex16,
	/// Zero-padded uppercase hex, 8 digits.
	Hex32,
	/// Zero-padded uppercase hex, 16 digits.
	Hex64,
}

/// Value payload of a tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
	/// 32-bit signed integer.
	I32(i32),
	/// 64-bit signed integer.
	I64(i64),
	/// Single-precision float.
	F32(f32),
	/// Nullable string; `None` renders as `null`.
	Str(Option<String>),
	/// Raw byte buffer, rendered as a `hex("…")` blob.
	Raw(Vec<u8>),
	/// Ordered container without member names.
	Array,
	/// Ordered container whose members are expected to carry names.
	Map,
}

impl NodeKind {
	/// Whether this kind may own children.
	pub fn is_container(&self) -> bool {
		matches!(self, Self::Array | Self::Map)
	}
}

/// One node of the generic value tree.
///
/// A node exclusively owns its name, payload, comment, and child subtree.
/// Children keep insertion order; only containers have any.
#[derive(Debug, Clone)]
pub struct Node {
	/// Member name when this node belongs to a map.
	pub name: Option<String>,
	/// Value payload.
	pub kind: NodeKind,
	/// Ordered children, empty for leaves.
	pub children: Vec<Node>,
	/// Numeric rendering hint.
	pub style: NumStyle,
	/// Comment printed immediately before the node.
	pub comment: Option<String>,
}

impl Node {
	/// Create a leaf or empty container with the given payload.
	pub fn new(name: Option<&str>, kind: NodeKind) -> Self {
		Self {
			name: name.map(str::to_owned),
			kind,
			children: Vec::new(),
			style: NumStyle::Decimal,
			comment: None,
		}
	}

	/// Create a named 32-bit integer leaf.
	pub fn int(name: Option<&str>, value: i32) -> Self {
		Self::new(name, NodeKind::I32(value))
	}

	/// Create a named 64-bit integer leaf.
	pub fn int64(name: Option<&str>, value: i64) -> Self {
		Self::new(name, NodeKind::I64(value))
	}

	/// Create a named float leaf.
	pub fn float(name: Option<&str>, value: f32) -> Self {
		Self::new(name, NodeKind::F32(value))
	}

	/// Create a named string leaf; `None` is the null string.
	pub fn string(name: Option<&str>, value: Option<&str>) -> Self {
		Self::new(name, NodeKind::Str(value.map(str::to_owned)))
	}

	/// Create a named raw-bytes leaf.
	pub fn raw(name: Option<&str>, bytes: Vec<u8>) -> Self {
		Self::new(name, NodeKind::Raw(bytes))
	}

	/// Create an empty array container.
	pub fn array(name: Option<&str>) -> Self {
		Self::new(name, NodeKind::Array)
	}

	/// Create an empty map container.
	pub fn map(name: Option<&str>) -> Self {
		Self::new(name, NodeKind::Map)
	}

	/// Set the numeric rendering hint, builder style.
	pub fn with_style(mut self, style: NumStyle) -> Self {
		self.style = style;
		self
	}

	/// Set the comment printed before the node, builder style.
	pub fn with_comment(mut self, comment: &str) -> Self {
		self.comment = Some(comment.to_owned());
		self
	}

	/// Append a child, taking ownership; amortized O(1).
	pub fn push_child(&mut self, child: Node) {
		self.children.push(child);
	}

	/// Find the first child with the given name.
	pub fn child(&self, name: &str) -> Option<&Node> {
		self.children.iter().find(|c| c.name.as_deref() == Some(name))
	}

	/// Remove and return the child at `index`, keeping sibling order.
	pub fn remove_child(&mut self, index: usize) -> Option<Node> {
		if index < self.children.len() {
			Some(self.children.remove(index))
		} else {
			None
		}
	}

	/// Number of direct children.
	pub fn child_count(&self) -> usize {
		self.children.len()
	}

	/// Coerce a numeric leaf to `i64`; non-numeric nodes yield 0.
	pub fn as_i64(&self) -> i64 {
		match self.kind {
			NodeKind::I32(v) => i64::from(v),
			NodeKind::I64(v) => v,
			_ => 0,
		}
	}

	/// Coerce a numeric leaf to `u64`, reinterpreting the stored bits.
	pub fn as_u64(&self) -> u64 {
		match self.kind {
			NodeKind::I32(v) => u64::from(v as u32),
			NodeKind::I64(v) => v as u64,
			_ => 0,
		}
	}

	/// Coerce a float leaf to `f32`; non-float nodes yield 0.
	pub fn as_f32(&self) -> f32 {
		match self.kind {
			NodeKind::F32(v) => v,
			_ => 0.0,
		}
	}

	/// Borrow the string payload when present and non-null.
	pub fn as_str(&self) -> Option<&str> {
		match &self.kind {
			NodeKind::Str(s) => s.as_deref(),
			_ => None,
		}
	}

	/// Semantic equality: same values and structure, ignoring style hints,
	/// comments, and the I32/I64 representation split.
	pub fn value_eq(&self, other: &Node) -> bool {
		if self.name != other.name {
			return false;
		}

		let payload_eq = match (&self.kind, &other.kind) {
			(NodeKind::I32(_) | NodeKind::I64(_), NodeKind::I32(_) | NodeKind::I64(_)) => {
				self.as_i64() == other.as_i64()
			}
			(NodeKind::F32(a), NodeKind::F32(b)) => a.to_bits() == b.to_bits(),
			(NodeKind::Str(a), NodeKind::Str(b)) => a == b,
			(NodeKind::Raw(a), NodeKind::Raw(b)) => a == b,
			(NodeKind::Array, NodeKind::Array) | (NodeKind::Map, NodeKind::Map) => true,
			_ => false,
		};
		if !payload_eq {
			return false;
		}

		self.children.len() == other.children.len()
			&& self.children.iter().zip(&other.children).all(|(a, b)| a.value_eq(b))
	}
}

#[cfg(test)]
mod tests {
	use super::{Node, NodeKind, NumStyle};

	#[test]
	fn append_keeps_insertion_order() {
		let mut map = Node::map(None);
		map.push_child(Node::int(Some("a"), 1));
		map.push_child(Node::int(Some("b"), 2));
		map.push_child(Node::int(Some("a"), 3));

		assert_eq!(map.child_count(), 3);
		let names: Vec<_> = map.children.iter().map(|c| c.name.as_deref()).collect();
		assert_eq!(names, [Some("a"), Some("b"), Some("a")]);
	}

	#[test]
	fn find_child_returns_first_match() {
		let mut map = Node::map(None);
		map.push_child(Node::int(Some("dup"), 1));
		map.push_child(Node::int(Some("dup"), 2));

		assert_eq!(map.child("dup").unwrap().as_i64(), 1);
		assert!(map.child("missing").is_none());
	}

	#[test]
	fn remove_child_preserves_sibling_order() {
		let mut arr = Node::array(None);
		for v in 0..4 {
			arr.push_child(Node::int(None, v));
		}

		let removed = arr.remove_child(1).unwrap();
		assert_eq!(removed.as_i64(), 1);
		let left: Vec<_> = arr.children.iter().map(Node::as_i64).collect();
		assert_eq!(left, [0, 2, 3]);
		assert!(arr.remove_child(10).is_none());
	}

	#[test]
	fn value_eq_ignores_style_and_width() {
		let a = Node::int(Some("x"), 7).with_style(NumStyle::Hex32);
		let b = Node::int64(Some("x"), 7);
		assert!(a.value_eq(&b));

		let c = Node::int64(Some("x"), 8);
		assert!(!a.value_eq(&c));
	}

	#[test]
	fn null_and_empty_string_stay_distinct() {
		let null = Node::string(None, None);
		let empty = Node::string(None, Some(""));
		assert!(!null.value_eq(&empty));
		assert_eq!(null.kind, NodeKind::Str(None));
	}
}
