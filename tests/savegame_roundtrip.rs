#![allow(missing_docs)]

use std::io::Cursor;
use std::path::Path;

use savcodec::sav::{
	ExtractOptions, Record, Savegame, Slot, compress_buffer, decompress_buffer, document_root,
	extract, pack, parse, render,
};

fn sample_save() -> Savegame {
	let mut display = Record::new("modDisplayString");
	display.push("name", Slot::Str("Nordic Pack".into()));
	display.push("severity", Slot::Int(0));

	let mut header = Record::new("header");
	header.push("signature", Slot::Ints(vec![0x74, 0x66, 0x2A, 0x2A]));
	header.push("savegameversion", Slot::Int(0x12));
	header.push("difficulty", Slot::Int(2));
	header.push("startYear", Slot::Int(1900));
	header.push("numTiles", Slot::Int(1024));
	header.push("date", Slot::Int(0x0001_86A0));
	header.push("money", Slot::Int(1_234_567_890));
	header.push("mods", Slot::Records(vec![display]));
	header.push("achievementsEarnable", Slot::Int(0));

	let mut entry = Record::new("modEntry");
	entry.push("name", Slot::Str("urban_games/nordic_1".into()));
	entry.push("unknown", Slot::Int(1));
	let mut mods = Record::new("mods");
	mods.push("mods", Slot::Records(vec![entry]));

	let mut kv_a = Record::new("keyValue");
	kv_a.push("key", Slot::Str("lastUsedCamera".into()));
	kv_a.push("value", Slot::Str("1".into()));
	let mut kv_b = Record::new("keyValue");
	kv_b.push("key", Slot::Str("townGrowth".into()));
	kv_b.push("value", Slot::Str("normal".into()));
	let mut settings = Record::new("settings");
	settings.push("_filepos", Slot::Offset(0));
	settings.push("entries", Slot::Records(vec![kv_a, kv_b]));

	let mut after = Record::new("aftersettings");
	after.push("_filepos", Slot::Offset(0));
	for name in ["unknownA1", "unknownA2", "unknownA3", "unknownA4", "unknownA5", "unknownA6"] {
		after.push(name, Slot::Int(0));
	}
	after.push("startYear", Slot::Int(1900));
	for name in ["unknownY1", "unknownY2", "unknownY3", "unknownY4", "unknownY5", "unknownY6"] {
		after.push(name, Slot::Int(0));
	}
	after.push("date", Slot::Int(0x0001_86A0));

	let mut rep = Record::new("modelRepEntry");
	rep.push("key", Slot::Str("vehicle/bus/mb_o305.mdl".into()));
	rep.push("unknown", Slot::Int(12));
	let mut model_rep = Record::new("modelrep");
	model_rep.push("_filepos", Slot::Offset(0));
	model_rep.push("entries", Slot::Records(vec![rep]));
	model_rep.push("_fileposEnd", Slot::Offset(0));

	Savegame {
		header,
		mods,
		settings,
		after_settings: after,
		model_rep,
		remaining: (0u32..4096).flat_map(u32::to_le_bytes).collect(),
	}
}

fn write_sample_file(dir: &Path) -> (std::path::PathBuf, Vec<u8>) {
	let mut save = sample_save();
	let mut plain = Cursor::new(Vec::new());
	save.encode(&mut plain).expect("container encodes");
	let plain = plain.into_inner();

	let packed = compress_buffer(&compress_buffer(&plain).expect("stage 1 compresses"))
		.expect("stage 2 compresses");
	let input = dir.join("game.sav");
	std::fs::write(&input, packed).expect("savegame file writes");
	(input, plain)
}

#[test]
fn extract_then_pack_is_byte_identical() {
	let tmp = tempfile::tempdir().expect("tempdir");
	let (input, plain) = write_sample_file(tmp.path());

	let outcome = extract(&input, &ExtractOptions::default()).expect("extraction succeeds");
	for file in
		["header.json", "mods.json", "settings.json", "aftersettings.json", "modelrep.json"]
	{
		assert!(outcome.dir.join(file).exists(), "{file} missing");
	}

	let packed = pack(&outcome.dir).expect("packing succeeds");
	let bytes = std::fs::read(&packed).expect("packed file reads");
	let stage1 = decompress_buffer(&bytes).expect("outer frame decompresses");
	let roundtripped = decompress_buffer(&stage1).expect("inner frame decompresses");
	assert_eq!(roundtripped, plain);
}

#[test]
fn hand_edited_mod_list_survives_repack() {
	let tmp = tempfile::tempdir().expect("tempdir");
	let (input, _) = write_sample_file(tmp.path());
	let outcome = extract(&input, &ExtractOptions::default()).expect("extraction succeeds");

	// Append a second mod entry without touching the stale num_mods leaf.
	let mods_file = outcome.dir.join("mods.json");
	let text = std::fs::read_to_string(&mods_file).expect("mods.json reads");
	let edited = text.replace(
		"    }\n  ]",
		"    },\n    {\n      \"name\": \"urban_games/nordic_2\",\n      \"unknown\": 1\n    }\n  ]",
	);
	assert_ne!(edited, text, "edit should apply");
	std::fs::write(&mods_file, edited).expect("mods.json writes");

	let packed = pack(&outcome.dir).expect("packing succeeds");
	let save = Savegame::load(&packed).expect("repacked savegame loads");
	match save.mods.get("mods") {
		Some(Slot::Records(records)) => {
			assert_eq!(records.len(), 2);
			assert_eq!(records[1].get("name"), Some(&Slot::Str("urban_games/nordic_2".into())));
		}
		other => panic!("unexpected slot {other:?}"),
	}
}

#[test]
fn extracted_text_files_reparse_cleanly() {
	let tmp = tempfile::tempdir().expect("tempdir");
	let (input, _) = write_sample_file(tmp.path());
	let outcome = extract(&input, &ExtractOptions::default()).expect("extraction succeeds");

	let text = std::fs::read_to_string(outcome.dir.join("settings.json")).expect("file reads");
	let root = parse(&text).expect("extracted notation parses");
	let doc = document_root(&root);
	assert_eq!(doc.child("numentries").expect("count leaf").as_i64(), 2);

	// Rendering the parsed tree again is a fixpoint.
	assert_eq!(render(doc), text);
}
