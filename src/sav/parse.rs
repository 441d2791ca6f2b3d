use crate::sav::{Node, NodeKind, Result, SavError};

const SNIPPET_BYTES: usize = 80;

/// Parse a notation document into a synthetic unnamed map root.
///
/// The root's children are the top-level values or `name: value` members of
/// the file, so documents may include or omit their outermost braces. The
/// first structural violation aborts the whole parse; there is no recovery
/// and no partial tree.
pub fn parse(input: &str) -> Result<Node> {
	let mut parser = Parser {
		src: input,
		bytes: input.as_bytes(),
		pos: 0,
		line: 1,
	};

	let mut root = Node::map(None);
	parser.parse_body(&mut root, None)?;
	Ok(root)
}

/// Unwrap a parsed document down to its single payload container.
///
/// Files conventionally hold one anonymous map; this returns that map when
/// the root wraps exactly one unnamed container, and the root itself when the
/// file was written as a bare member list.
pub fn document_root(root: &Node) -> &Node {
	match root.children.as_slice() {
		[only] if only.name.is_none() && only.kind.is_container() => only,
		_ => root,
	}
}

struct Parser<'a> {
	src: &'a str,
	bytes: &'a [u8],
	pos: usize,
	line: u32,
}

impl<'a> Parser<'a> {
	fn peek(&self) -> Option<u8> {
		self.bytes.get(self.pos).copied()
	}

	fn bump(&mut self) -> Option<u8> {
		let c = self.peek()?;
		if c == b'\n' {
			self.line += 1;
		}
		self.pos += 1;
		Some(c)
	}

	fn err(&self, message: impl Into<String>) -> SavError {
		let mut end = (self.pos + SNIPPET_BYTES).min(self.src.len());
		while end < self.src.len() && !self.src.is_char_boundary(end) {
			end += 1;
		}
		let mut start = self.pos.min(self.src.len());
		while start < self.src.len() && !self.src.is_char_boundary(start) {
			start += 1;
		}
		SavError::Parse {
			line: self.line,
			snippet: self.src[start..end].to_owned(),
			message: message.into(),
		}
	}

	/// Skip whitespace and both comment forms, counting lines.
	fn skip_trivia(&mut self) {
		loop {
			match self.peek() {
				Some(c) if c.is_ascii_whitespace() => {
					self.bump();
				}
				Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
					while let Some(c) = self.bump() {
						if c == b'\n' {
							break;
						}
					}
				}
				Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'*') => {
					self.pos += 2;
					// Non-nesting: the first */ closes the comment.
					loop {
						match self.peek() {
							None => return,
							Some(b'*') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
								self.pos += 2;
								break;
							}
							_ => {
								self.bump();
							}
						}
					}
				}
				_ => return,
			}
		}
	}

	/// Parse members into `parent` until the closing delimiter (or EOF at top level).
	fn parse_body(&mut self, parent: &mut Node, closer: Option<u8>) -> Result<()> {
		loop {
			self.skip_trivia();
			match self.peek() {
				None => {
					return match closer {
						None => Ok(()),
						Some(c) => Err(self.err(format!("missing {}", char::from(c)))),
					};
				}
				Some(c) if Some(c) == closer => {
					self.pos += 1;
					return Ok(());
				}
				Some(c @ (b'}' | b']')) => {
					return match closer {
						Some(want) => Err(self.err(format!("missing {}", char::from(want)))),
						None => Err(self.err(format!("unexpected {}", char::from(c)))),
					};
				}
				_ => {}
			}

			let child = self.parse_member()?;
			parent.push_child(child);

			self.skip_trivia();
			if self.peek() == Some(b',') {
				self.pos += 1;
			}
		}
	}

	/// Parse one `name: value` member or bare value.
	fn parse_member(&mut self) -> Result<Node> {
		if matches!(self.peek(), Some(b'"' | b'\'')) {
			let text = self.parse_quoted()?;
			self.skip_trivia();
			if self.peek() == Some(b':') {
				self.pos += 1;
				self.skip_trivia();
				return self.parse_value(Some(text));
			}
			return Ok(Node::new(None, NodeKind::Str(Some(text))));
		}
		self.parse_value(None)
	}

	fn parse_value(&mut self, name: Option<String>) -> Result<Node> {
		let name = name.as_deref();
		match self.peek() {
			Some(c) if c == b'-' || c.is_ascii_digit() => self.parse_number(name),
			Some(b'"' | b'\'') => {
				let text = self.parse_quoted()?;
				Ok(Node::string(name, Some(&text)))
			}
			Some(b'n') => {
				self.expect_keyword("null")?;
				Ok(Node::string(name, None))
			}
			Some(b'h') => self.parse_hexblob(name),
			Some(b'{') => {
				self.pos += 1;
				let mut map = Node::map(name);
				self.parse_body(&mut map, Some(b'}'))?;
				Ok(map)
			}
			Some(b'[') => {
				self.pos += 1;
				let mut arr = Node::array(name);
				self.parse_body(&mut arr, Some(b']'))?;
				Ok(arr)
			}
			Some(b':') => Err(self.err("unexpected :")),
			Some(b',' | b'}' | b']') | None => Err(self.err("missing value")),
			Some(c) => Err(self.err(format!("unexpected 0x{c:02X}"))),
		}
	}

	fn expect_keyword(&mut self, word: &str) -> Result<()> {
		if self.bytes[self.pos..].starts_with(word.as_bytes()) {
			self.pos += word.len();
			Ok(())
		} else {
			Err(self.err(format!("expected {word}")))
		}
	}

	fn parse_number(&mut self, name: Option<&str>) -> Result<Node> {
		let start = self.pos;
		let negative = self.peek() == Some(b'-');
		if negative {
			self.pos += 1;
		}
		if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
			return Err(self.err("missing value"));
		}

		let hex = self.peek() == Some(b'0') && matches!(self.bytes.get(self.pos + 1), Some(b'x' | b'X'));
		if hex {
			self.pos += 2;
			let digits_start = self.pos;
			while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
				self.pos += 1;
			}
			if self.peek() == Some(b'.') {
				return Err(self.err("unexpected mixed hex/float value"));
			}
			if self.pos == digits_start {
				return Err(self.err("malformed hex literal"));
			}
			let magnitude = u64::from_str_radix(&self.src[digits_start..self.pos], 16)
				.map_err(|_| self.err("hex literal out of range"))?;
			let value = if negative {
				(magnitude as i64).wrapping_neg()
			} else {
				magnitude as i64
			};
			return Ok(Node::int64(name, value));
		}

		let mut is_float = false;
		while let Some(c) = self.peek() {
			if c.is_ascii_digit() {
				self.pos += 1;
			} else if c == b'.' {
				is_float = true;
				self.pos += 1;
			} else {
				break;
			}
		}

		let text = &self.src[start..self.pos];
		if is_float {
			let value: f32 = text.parse().map_err(|_| self.err("malformed number"))?;
			return Ok(Node::float(name, value));
		}

		let value = if negative {
			text.parse::<i64>().map_err(|_| self.err("integer literal out of range"))?
		} else {
			// Unsigned magnitudes up to 2^64-1 are accepted and stored
			// as the same 64 bits, matching the binary codec's widths.
			text.parse::<u64>().map_err(|_| self.err("integer literal out of range"))? as i64
		};
		Ok(Node::int64(name, value))
	}

	fn parse_quoted(&mut self) -> Result<String> {
		let quote = self.bump().unwrap_or(0);
		let mut buf: Vec<u8> = Vec::new();
		loop {
			let Some(c) = self.bump() else {
				return Err(self.err("unterminated string"));
			};
			if c == quote {
				break;
			}
			if c != b'\\' {
				buf.push(c);
				continue;
			}
			let Some(esc) = self.bump() else {
				return Err(self.err("unterminated string"));
			};
			match esc {
				b'b' => buf.push(0x08),
				b'f' => buf.push(0x0C),
				b'n' => buf.push(b'\n'),
				b'r' => buf.push(b'\r'),
				b't' => buf.push(b'\t'),
				b'u' => return Err(self.err("unicode escapes not supported")),
				other => buf.push(other),
			}
		}
		String::from_utf8(buf).map_err(|_| self.err("invalid utf-8 in string"))
	}

	fn parse_hexblob(&mut self, name: Option<&str>) -> Result<Node> {
		self.expect_keyword("hex(")?;
		self.skip_trivia();
		if self.peek() != Some(b'"') {
			return Err(self.err("expected string after hex("));
		}
		self.pos += 1;

		let mut bytes = Vec::new();
		let mut pending: Option<u8> = None;
		loop {
			match self.bump() {
				None => return Err(self.err("unterminated hex blob")),
				Some(b'"') => break,
				Some(c) => {
					let digit = match c {
						b'0'..=b'9' => c - b'0',
						b'A'..=b'F' => c - b'A' + 10,
						b'a'..=b'f' => c - b'a' + 10,
						_ => return Err(self.err(format!("invalid hex digit 0x{c:02X}"))),
					};
					match pending.take() {
						Some(high) => bytes.push((high << 4) | digit),
						None => pending = Some(digit),
					}
				}
			}
		}
		if pending.is_some() {
			return Err(self.err("odd number of hex digits"));
		}

		self.skip_trivia();
		if self.peek() != Some(b')') {
			return Err(self.err("expected closing bracket ) for hex("));
		}
		self.pos += 1;
		Ok(Node::raw(name, bytes))
	}
}

#[cfg(test)]
mod tests {
	use super::{document_root, parse};
	use crate::sav::{NodeKind, SavError};

	fn parse_err(input: &str) -> (u32, String) {
		match parse(input) {
			Err(SavError::Parse { line, message, .. }) => (line, message),
			other => panic!("expected parse error, got {other:?}"),
		}
	}

	#[test]
	fn bare_member_list_is_wrapped() {
		let root = parse("\"a\": 1,\n\"b\": 2\n").unwrap();
		assert_eq!(root.child_count(), 2);
		assert_eq!(root.child("a").unwrap().as_i64(), 1);
		assert_eq!(root.child("b").unwrap().as_i64(), 2);
		assert!(std::ptr::eq(document_root(&root), &root));
	}

	#[test]
	fn single_object_document_unwraps() {
		let root = parse("{\n  \"x\": 3\n}\n").unwrap();
		assert_eq!(root.child_count(), 1);
		let payload = document_root(&root);
		assert!(matches!(payload.kind, NodeKind::Map));
		assert_eq!(payload.child("x").unwrap().as_i64(), 3);
	}

	#[test]
	fn numbers_cover_decimal_hex_and_float() {
		let root = parse("\"d\": -42, \"h\": 0x1F, \"f\": 3.5, \"big\": 0xFFFFFFFFFFFFFFFF").unwrap();
		assert_eq!(root.child("d").unwrap().as_i64(), -42);
		assert_eq!(root.child("h").unwrap().as_i64(), 0x1F);
		assert_eq!(root.child("f").unwrap().as_f32(), 3.5);
		assert_eq!(root.child("big").unwrap().as_u64(), u64::MAX);
	}

	#[test]
	fn mixed_hex_float_is_rejected() {
		let (line, message) = parse_err("\"v\": 0x12.5");
		assert_eq!(line, 1);
		assert!(message.contains("mixed hex/float"));
	}

	#[test]
	fn string_escapes_are_decoded() {
		let root = parse(r#""s": "a\"b\\c\n\td""#).unwrap();
		assert_eq!(root.child("s").unwrap().as_str(), Some("a\"b\\c\n\td"));
	}

	#[test]
	fn single_quoted_strings_are_accepted() {
		let root = parse("'k': 'value'").unwrap();
		assert_eq!(root.child("k").unwrap().as_str(), Some("value"));
	}

	#[test]
	fn unicode_escape_is_a_parse_error() {
		let (_, message) = parse_err(r#""s": "a\u0041""#);
		assert!(message.contains("unicode"));
	}

	#[test]
	fn unterminated_string_reports_its_line() {
		let (line, message) = parse_err("\"a\": 1,\n\"s\": \"oops");
		assert_eq!(line, 2);
		assert!(message.contains("unterminated"));
	}

	#[test]
	fn null_and_empty_string_parse_differently() {
		let root = parse("\"n\": null, \"e\": \"\"").unwrap();
		assert_eq!(root.child("n").unwrap().kind, NodeKind::Str(None));
		assert_eq!(root.child("e").unwrap().kind, NodeKind::Str(Some(String::new())));
	}

	#[test]
	fn comments_are_skipped_anywhere() {
		let input = "// leading\n\"a\": /* inline */ 1, /* multi\nline */ \"b\": 2 // trailing";
		let root = parse(input).unwrap();
		assert_eq!(root.child("a").unwrap().as_i64(), 1);
		assert_eq!(root.child("b").unwrap().as_i64(), 2);
	}

	#[test]
	fn hexblob_decodes_pairwise() {
		let root = parse("\"raw\": hex(\"00FF10ab\")").unwrap();
		assert_eq!(root.child("raw").unwrap().kind, NodeKind::Raw(vec![0x00, 0xFF, 0x10, 0xAB]));
	}

	#[test]
	fn hexblob_rejects_odd_digit_count() {
		let (_, message) = parse_err("\"raw\": hex(\"ABC\")");
		assert!(message.contains("odd number"));
	}

	#[test]
	fn hexblob_rejects_bad_digit() {
		let (_, message) = parse_err("\"raw\": hex(\"GG\")");
		assert!(message.contains("invalid hex digit"));
	}

	#[test]
	fn missing_value_after_colon_reports_line() {
		let (line, message) = parse_err("{\n\"a\": }\n");
		assert_eq!(line, 2);
		assert_eq!(message, "missing value");
	}

	#[test]
	fn missing_closing_brace_is_reported() {
		let (line, message) = parse_err("{\"a\": [1, 2\n}");
		assert_eq!(line, 2, "error surfaces where the mismatch is noticed");
		assert!(message.contains("missing ]") || message.contains("missing }"), "{message}");
	}

	#[test]
	fn stray_colon_is_rejected() {
		let (_, message) = parse_err("\"a\": 1, : 2");
		assert!(message.contains("unexpected :"));
	}

	#[test]
	fn nested_containers_keep_structure() {
		let root = parse("\"outer\": { \"list\": [1, { \"deep\": 2 }, []] }").unwrap();
		let outer = root.child("outer").unwrap();
		let list = outer.child("list").unwrap();
		assert!(matches!(list.kind, NodeKind::Array));
		assert_eq!(list.child_count(), 3);
		assert_eq!(list.children[1].child("deep").unwrap().as_i64(), 2);
		assert_eq!(list.children[2].child_count(), 0);
	}
}
