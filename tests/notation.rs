#![allow(missing_docs)]

use savcodec::sav::{Node, NodeKind, NumStyle, SavError, document_root, parse, render};

#[test]
fn bare_member_files_and_braced_files_are_equivalent() {
	let braced = parse("{\n\"year\": 1950,\n\"name\": \"main\"\n}").expect("braced form parses");
	let bare = parse("\"year\": 1950,\n\"name\": \"main\"").expect("bare form parses");

	let braced = document_root(&braced);
	let bare = document_root(&bare);
	assert!(braced.value_eq(bare));
}

#[test]
fn trees_survive_a_render_parse_cycle() {
	let mut root = Node::map(None);
	root.push_child(Node::int(Some("flags"), -19).with_style(NumStyle::Hex16));
	root.push_child(Node::float(Some("scale"), 0.25));
	root.push_child(Node::string(Some("label"), Some("a/b \"c\"\n")));
	root.push_child(Node::string(Some("missing"), None));
	root.push_child(Node::raw(Some("blob"), vec![0x00, 0x7F, 0xFF]));
	let mut list = Node::array(Some("items"));
	list.push_child(Node::int(None, 1));
	list.push_child(Node::int64(None, i64::MAX));
	root.push_child(list);

	let text = render(&root);
	let back = parse(&text).expect("rendered notation parses");
	assert!(document_root(&back).value_eq(&root), "cycle changed the tree:\n{text}");
}

#[test]
fn raw_bytes_of_every_value_roundtrip() {
	let bytes: Vec<u8> = (0u8..=255).collect();
	let mut root = Node::map(None);
	root.push_child(Node::raw(Some("data"), bytes.clone()));

	let back = parse(&render(&root)).expect("hex blob parses");
	match &document_root(&back).child("data").expect("data member").kind {
		NodeKind::Raw(out) => assert_eq!(out, &bytes),
		other => panic!("unexpected kind {other:?}"),
	}
}

#[test]
fn missing_value_reports_its_line() {
	let err = parse("{\n\"a\": }").expect_err("missing value must be rejected");
	match err {
		SavError::Parse { line, message, .. } => {
			assert_eq!(line, 2);
			assert!(message.contains("missing value"), "{message}");
		}
		other => panic!("unexpected error {other}"),
	}
}

#[test]
fn comments_are_trivia_everywhere() {
	let text = "// line comment\n{\n/* block */ \"a\": /* here */ 1,\n\"b\": 2 // tail\n}";
	let root = parse(text).expect("commented notation parses");
	let doc = document_root(&root);
	assert_eq!(doc.child("a").expect("a").as_i64(), 1);
	assert_eq!(doc.child("b").expect("b").as_i64(), 2);
}
