use std::fmt::Write as _;

use crate::sav::{Node, NodeKind, NumStyle};

/// Render one node as a whole document, with a trailing newline.
pub fn render(node: &Node) -> String {
	let mut out = String::new();
	render_node(node, &mut out, 0);
	out.push('\n');
	out
}

/// Render one node into `out` at the given nesting level (2 spaces each).
///
/// Emits the comment line, the `"name": ` prefix, and the payload; sibling
/// separators are the container's responsibility.
pub fn render_node(node: &Node, out: &mut String, level: usize) {
	let indent = level * 2;
	if let Some(comment) = &node.comment {
		let _ = writeln!(out, "{:indent$}/* {comment} */", "");
	}
	match &node.name {
		Some(name) => {
			let _ = write!(out, "{:indent$}", "");
			render_string(name, out);
			out.push_str(": ");
		}
		None => {
			let _ = write!(out, "{:indent$}", "");
		}
	}

	match &node.kind {
		NodeKind::I32(v) => render_int(i64::from(*v), node.style, out),
		NodeKind::I64(v) => render_int(*v, node.style, out),
		NodeKind::F32(v) => {
			// Shortest round-tripping form; always carries a '.' so the
			// parser reads it back as a float.
			let _ = write!(out, "{v:?}");
		}
		NodeKind::Str(Some(s)) => render_string(s, out),
		NodeKind::Str(None) => out.push_str("null"),
		NodeKind::Raw(bytes) => {
			out.push_str("hex(\"");
			for byte in bytes {
				let _ = write!(out, "{byte:02X}");
			}
			out.push_str("\")");
		}
		NodeKind::Array => render_container(node, out, level, '[', ']'),
		NodeKind::Map => render_container(node, out, level, '{', '}'),
	}
}

fn render_container(node: &Node, out: &mut String, level: usize, open: char, close: char) {
	out.push(open);
	out.push('\n');
	let last = node.children.len().saturating_sub(1);
	for (i, child) in node.children.iter().enumerate() {
		render_node(child, out, level + 1);
		if i < last {
			out.push(',');
		}
		out.push('\n');
	}
	let indent = level * 2;
	let _ = write!(out, "{:indent$}{close}", "");
}

fn render_int(value: i64, style: NumStyle, out: &mut String) {
	let _ = match style {
		NumStyle::Decimal => write!(out, "{value}"),
		NumStyle::Hex8 => write!(out, "0x{:02X}", value as u8),
		NumStyle::Hex16 => write!(out, "0x{:04X}", value as u16),
		NumStyle::Hex32 => write!(out, "0x{:08X}", value as u32),
		NumStyle::Hex64 => write!(out, "0x{:016X}", value as u64),
	};
}

fn render_string(s: &str, out: &mut String) {
	out.push('"');
	for c in s.chars() {
		match c {
			'"' | '\\' | '/' => {
				out.push('\\');
				out.push(c);
			}
			'\u{8}' => out.push_str("\\b"),
			'\u{c}' => out.push_str("\\f"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\t' => out.push_str("\\t"),
			other => out.push(other),
		}
	}
	out.push('"');
}

#[cfg(test)]
mod tests {
	use super::{render, render_node};
	use crate::sav::{Node, NumStyle, document_root, parse};

	fn roundtrip(node: &Node) -> Node {
		let text = render(node);
		let root = parse(&text).unwrap_or_else(|e| panic!("reparse failed: {e}\n{text}"));
		document_root(&root).clone()
	}

	#[test]
	fn pretty_printing_matches_expected_layout() {
		let mut map = Node::map(None);
		map.push_child(Node::int(Some("version"), 18));
		let mut list = Node::array(Some("mods"));
		let mut entry = Node::map(None);
		entry.push_child(Node::string(Some("name"), Some("base")));
		list.push_child(entry);
		map.push_child(list);

		let expected = "{\n  \"version\": 18,\n  \"mods\": [\n    {\n      \"name\": \"base\"\n    }\n  ]\n}\n";
		assert_eq!(render(&map), expected);
	}

	#[test]
	fn hex_width_4_is_exact_for_signed_and_unsigned() {
		for value in [-1_i32, i32::from(i16::MIN), 0, 1, i32::from(i16::MAX), 0xBEEF_u16 as i32] {
			let mut out = String::new();
			render_node(&Node::int(None, value).with_style(NumStyle::Hex16), &mut out, 0);
			assert!(out.starts_with("0x"), "{out}");
			let digits = &out[2..];
			assert_eq!(digits.len(), 4, "{out}");
			assert!(digits.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()), "{out}");
		}

		let mut out = String::new();
		render_node(&Node::int(None, -1).with_style(NumStyle::Hex16), &mut out, 0);
		assert_eq!(out, "0xFFFF");
	}

	#[test]
	fn hex_styles_mask_to_their_width() {
		let cases: [(NumStyle, &str); 4] = [
			(NumStyle::Hex8, "0xFF"),
			(NumStyle::Hex16, "0xFFFF"),
			(NumStyle::Hex32, "0xFFFFFFFF"),
			(NumStyle::Hex64, "0xFFFFFFFFFFFFFFFF"),
		];
		for (style, expected) in cases {
			let mut out = String::new();
			render_node(&Node::int64(None, -1).with_style(style), &mut out, 0);
			assert_eq!(out, expected);
		}
	}

	#[test]
	fn style_does_not_change_the_reparsed_value() {
		let node = Node::int(Some("flags"), 0x1234).with_style(NumStyle::Hex32);
		let back = roundtrip(&wrap(node.clone()));
		assert_eq!(back.child("flags").unwrap().as_i64(), 0x1234);
	}

	#[test]
	fn raw_bytes_roundtrip_exactly() {
		let bytes: Vec<u8> = (0..=255).collect();
		let mut map = Node::map(None);
		map.push_child(Node::raw(Some("blob"), bytes.clone()));

		let back = roundtrip(&map);
		assert_eq!(back.child("blob").unwrap().kind, crate::sav::NodeKind::Raw(bytes));
	}

	#[test]
	fn tree_roundtrips_structurally() {
		let mut map = Node::map(None);
		map.push_child(Node::int(Some("a"), -7).with_style(NumStyle::Hex32));
		map.push_child(Node::int64(Some("b"), i64::MIN));
		map.push_child(Node::float(Some("c"), 2.0));
		map.push_child(Node::float(Some("d"), -0.125));
		map.push_child(Node::string(Some("e"), Some("tab\there \"quoted\" / slash")));
		map.push_child(Node::string(Some("nul"), None));
		map.push_child(Node::string(Some("empty"), Some("")));
		let mut inner = Node::array(Some("list"));
		inner.push_child(Node::int(None, 1));
		inner.push_child(Node::map(None));
		map.push_child(inner);

		let back = roundtrip(&map);
		assert!(back.value_eq(&map), "reparsed tree differs:\n{back:#?}");
	}

	#[test]
	fn comment_precedes_the_node() {
		let node = Node::int(Some("x"), 1).with_comment("edited by hand");
		let text = render(&wrap(node));
		assert!(text.contains("/* edited by hand */\n"));
		// Comments are trivia on re-parse.
		let back = parse(&text).unwrap();
		assert_eq!(document_root(&back).child("x").unwrap().as_i64(), 1);
	}

	fn wrap(node: Node) -> Node {
		let mut map = Node::map(None);
		map.push_child(node);
		map
	}
}
