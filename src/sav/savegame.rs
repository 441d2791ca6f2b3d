//! Container pipelines and record schemas for the supported savegame format.
//!
//! A savegame is an LZ4 frame wrapped around a second LZ4 frame wrapped
//! around the raw container: a `tf**` header record, the mod list, the
//! settings config, the after-settings block, the model repository, and an
//! opaque byte tail that is carried along verbatim.

use std::fs;
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::sav::error::{Result, SavError};
use crate::sav::frame::{compress_buffer, decompress_buffer};
use crate::sav::record::{Record, Slot};
use crate::sav::render::render;
use crate::sav::schema::{Field, ScalarKind, Schema};
use crate::sav::{document_root, parse};

/// Magic of an LZ4 frame, the outer layers of a compressed savegame.
const FRAME_MAGIC: u32 = 0x184D_2204;
/// Magic of the raw container, the bytes `tf**` read as a u32-LE.
const RAW_MAGIC: u32 = 0x2A2A_6674;
/// The only container version this codec understands.
const SAVEGAME_VERSION: u32 = 0x12;

const SIGNATURE: [u8; 4] = *b"tf**";

fn mod_display_schema() -> Schema {
	Schema::new("modDisplayString")
		.field(Field::len_string("name"))
		.field(Field::scalar("severity", ScalarKind::U32))
}

fn header_schema() -> Schema {
	Schema::new("header")
		.field(Field::fixed_array("signature", ScalarKind::U8, 4))
		.field(Field::scalar("savegameversion", ScalarKind::S32))
		.field(Field::scalar("difficulty", ScalarKind::S32))
		.field(Field::scalar("startYear", ScalarKind::S32))
		.field(Field::scalar("numTiles", ScalarKind::S32))
		.field(Field::scalar("date", ScalarKind::U32))
		.field(Field::scalar("money", ScalarKind::S64))
		.field(Field::vector("mods", ScalarKind::S32, "num_mods", mod_display_schema()))
		.field(Field::scalar("achievementsEarnable", ScalarKind::U8))
}

fn mods_schema() -> Schema {
	let entry = Schema::new("modEntry")
		.field(Field::len_string("name"))
		.field(Field::scalar("unknown", ScalarKind::U32));
	Schema::new("mods").field(Field::vector("mods", ScalarKind::S32, "num_mods", entry))
}

fn settings_schema() -> Schema {
	let entry = Schema::new("keyValue")
		.field(Field::len_string("key"))
		.field(Field::len_string("value"));
	Schema::new("settings")
		.field(Field::offset("_filepos"))
		.field(Field::vector("entries", ScalarKind::U32, "numentries", entry))
}

fn after_settings_schema() -> Schema {
	Schema::new("aftersettings")
		.field(Field::offset("_filepos"))
		.field(Field::scalar("unknownA1", ScalarKind::U8))
		.field(Field::scalar("unknownA2", ScalarKind::U16))
		.field(Field::scalar("unknownA3", ScalarKind::U32))
		.field(Field::scalar("unknownA4", ScalarKind::U32))
		.field(Field::scalar("unknownA5", ScalarKind::U32))
		.field(Field::scalar("unknownA6", ScalarKind::U32))
		.field(Field::scalar("startYear", ScalarKind::S32))
		.field(Field::scalar("unknownY1", ScalarKind::U32))
		.field(Field::scalar("unknownY2", ScalarKind::U32))
		.field(Field::scalar("unknownY3", ScalarKind::U32))
		.field(Field::scalar("unknownY4", ScalarKind::U32))
		.field(Field::scalar("unknownY5", ScalarKind::U32))
		.field(Field::scalar("unknownY6", ScalarKind::U32))
		.field(Field::scalar("date", ScalarKind::U32))
}

fn model_rep_schema() -> Schema {
	let entry = Schema::new("modelRepEntry")
		.field(Field::len_string("key"))
		.field(Field::scalar("unknown", ScalarKind::U32));
	Schema::new("modelrep")
		.field(Field::offset("_filepos"))
		.field(Field::vector("entries", ScalarKind::U32, "numentries", entry))
		.field(Field::offset("_fileposEnd"))
}

/// The decoded front matter of a savegame plus its undecoded byte tail.
#[derive(Debug, Clone, PartialEq)]
pub struct Savegame {
	/// Signature, version, start conditions, and the mod display list.
	pub header: Record,
	/// Installed mod list.
	pub mods: Record,
	/// Key/value settings config.
	pub settings: Record,
	/// Block following the settings, mostly unmapped.
	pub after_settings: Record,
	/// Model repository table.
	pub model_rep: Record,
	/// Everything after the last decoded record, copied verbatim.
	pub remaining: Vec<u8>,
}

/// Machine-readable digest of a savegame, for the `info` command.
#[derive(Debug, Serialize)]
pub struct SaveSummary {
	/// Container version.
	pub version: i32,
	/// Difficulty setting.
	pub difficulty: i32,
	/// Starting year.
	pub start_year: i32,
	/// Map tile count.
	pub num_tiles: i32,
	/// In-game date stamp.
	pub date: u32,
	/// Player money.
	pub money: i64,
	/// Whether achievements can still be earned.
	pub achievements_earnable: bool,
	/// Display names of the mods the save was created with.
	pub mods: Vec<String>,
	/// Number of settings entries.
	pub settings_entries: usize,
	/// Number of model repository entries.
	pub model_entries: usize,
	/// Size of the undecoded tail in bytes.
	pub remaining_bytes: usize,
}

impl Savegame {
	/// Decode the record region from a raw (uncompressed) container stream
	/// and capture the remaining tail.
	pub fn decode<R: Read + Seek>(r: &mut R) -> Result<Self> {
		let header = header_schema().decode(r)?;
		verify_header(&header)?;
		log_record("header", &header_schema(), &header);

		let mods = mods_schema().decode(r)?;
		log_record("mods", &mods_schema(), &mods);
		let settings = settings_schema().decode(r)?;
		log_record("settings", &settings_schema(), &settings);
		let after_settings = after_settings_schema().decode(r)?;
		log_record("aftersettings", &after_settings_schema(), &after_settings);
		let model_rep = model_rep_schema().decode(r)?;
		log_record("modelrep", &model_rep_schema(), &model_rep);

		let mut remaining = Vec::new();
		r.read_to_end(&mut remaining)?;
		debug!(bytes = remaining.len(), "copied undecoded tail");

		Ok(Self { header, mods, settings, after_settings, model_rep, remaining })
	}

	/// Encode the record region followed by the verbatim tail.
	pub fn encode<W: Write + Seek>(&mut self, w: &mut W) -> Result<()> {
		header_schema().encode(&mut self.header, w)?;
		mods_schema().encode(&mut self.mods, w)?;
		settings_schema().encode(&mut self.settings, w)?;
		after_settings_schema().encode(&mut self.after_settings, w)?;
		model_rep_schema().encode(&mut self.model_rep, w)?;
		w.write_all(&self.remaining)?;
		Ok(())
	}

	/// Load a savegame file, unwrapping the compression layers if present.
	pub fn load(path: &Path) -> Result<Self> {
		let bytes = fs::read(path)?;
		let (plain, _) = unwrap_container(bytes)?;
		Self::decode(&mut Cursor::new(plain))
	}

	/// Summarize the decoded front matter.
	pub fn summary(&self) -> SaveSummary {
		let mods = match self.header.get("mods") {
			Some(Slot::Records(records)) => records
				.iter()
				.map(|r| match r.get("name") {
					Some(Slot::Str(s)) => s.clone(),
					_ => String::new(),
				})
				.collect(),
			_ => Vec::new(),
		};
		SaveSummary {
			version: self.header.int("savegameversion").unwrap_or(0) as i32,
			difficulty: self.header.int("difficulty").unwrap_or(0) as i32,
			start_year: self.header.int("startYear").unwrap_or(0) as i32,
			num_tiles: self.header.int("numTiles").unwrap_or(0) as i32,
			date: self.header.int("date").unwrap_or(0) as u32,
			money: self.header.int("money").unwrap_or(0),
			achievements_earnable: self.header.int("achievementsEarnable").unwrap_or(0) != 0,
			mods,
			settings_entries: vector_len(&self.settings, "entries"),
			model_entries: vector_len(&self.model_rep, "entries"),
			remaining_bytes: self.remaining.len(),
		}
	}
}

fn vector_len(rec: &Record, name: &str) -> usize {
	match rec.get(name) {
		Some(Slot::Records(records)) => records.len(),
		_ => 0,
	}
}

fn verify_header(header: &Record) -> Result<()> {
	let sig_ok = matches!(
		header.get("signature"),
		Some(Slot::Ints(sig)) if sig.iter().map(|v| *v as u8).eq(SIGNATURE.iter().copied())
	);
	if !sig_ok {
		return Err(SavError::BadSignature);
	}
	let found = header.int("savegameversion").unwrap_or(0) as u32;
	if found != SAVEGAME_VERSION {
		return Err(SavError::UnsupportedVersion { expected: SAVEGAME_VERSION, found });
	}
	Ok(())
}

fn log_record(label: &str, schema: &Schema, rec: &Record) {
	if tracing::enabled!(tracing::Level::DEBUG) {
		let mut dump = String::new();
		schema.dump(rec, &mut dump, 1);
		debug!("{label}:\n{dump}");
	}
}

/// Strip the compression layers; returns the raw container bytes and whether
/// the input was compressed at all.
fn unwrap_container(bytes: Vec<u8>) -> Result<(Vec<u8>, bool)> {
	let mut magic = [0u8; 4];
	let head = bytes.len().min(4);
	magic[..head].copy_from_slice(&bytes[..head]);

	match u32::from_le_bytes(magic) {
		FRAME_MAGIC => {
			info!(bytes = bytes.len(), "compressed savegame, unwrapping two frame layers");
			let stage1 = decompress_buffer(&bytes)?;
			debug!(bytes = stage1.len(), "stage 1 decompressed");
			let plain = decompress_buffer(&stage1)?;
			debug!(bytes = plain.len(), "stage 2 decompressed");
			Ok((plain, true))
		}
		RAW_MAGIC => Ok((bytes, false)),
		_ => Err(SavError::UnknownMagic { magic }),
	}
}

/// Names of the record text files inside an extracted directory.
const RECORD_FILES: [&str; 5] =
	["header.json", "mods.json", "settings.json", "aftersettings.json", "modelrep.json"];

/// Extraction switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
	/// Reuse an existing output directory instead of probing for a free name.
	pub force_dir: bool,
}

/// Where an extraction landed and what it found.
#[derive(Debug)]
pub struct ExtractOutcome {
	/// Directory the text files were written into.
	pub dir: PathBuf,
	/// Digest of the decoded savegame.
	pub summary: SaveSummary,
}

/// Derive and create the output directory for an extraction.
///
/// Starts from the input filename minus its extension; when that name is
/// taken, probes `.0` through `.99` suffixes unless `force` allows reusing
/// the existing directory.
pub fn derive_output_dir(input: &Path, force: bool) -> Result<PathBuf> {
	let base = input.with_extension("");
	if !base.exists() {
		info!(dir = %base.display(), "creating output directory");
		fs::create_dir(&base)?;
		return Ok(base);
	}
	if force && base.is_dir() {
		info!(dir = %base.display(), "reusing output directory");
		return Ok(base);
	}
	for i in 0..100 {
		let mut name = base.as_os_str().to_os_string();
		name.push(format!(".{i}"));
		let candidate = PathBuf::from(name);
		if !candidate.exists() {
			info!(dir = %candidate.display(), "creating output directory");
			fs::create_dir(&candidate)?;
			return Ok(candidate);
		}
	}
	Err(SavError::OutputDirExhausted { base: base.display().to_string() })
}

/// Extract a savegame file into a directory of editable text files.
pub fn extract(input: &Path, opts: &ExtractOptions) -> Result<ExtractOutcome> {
	info!(file = %input.display(), "extracting savegame");
	let bytes = fs::read(input)?;
	let dir = derive_output_dir(input, opts.force_dir)?;

	let (plain, was_compressed) = unwrap_container(bytes)?;
	if was_compressed {
		fs::write(dir.join("uncompressed.data"), &plain)?;
	}

	let save = Savegame::decode(&mut Cursor::new(plain))?;

	write_record(&dir, RECORD_FILES[0], &header_schema(), &save.header)?;
	write_record(&dir, RECORD_FILES[1], &mods_schema(), &save.mods)?;
	write_record(&dir, RECORD_FILES[2], &settings_schema(), &save.settings)?;
	write_record(&dir, RECORD_FILES[3], &after_settings_schema(), &save.after_settings)?;
	write_record(&dir, RECORD_FILES[4], &model_rep_schema(), &save.model_rep)?;
	fs::write(dir.join("remaining.data"), &save.remaining)?;

	let summary = save.summary();
	info!(dir = %dir.display(), mods = summary.mods.len(), "extraction complete");
	Ok(ExtractOutcome { dir, summary })
}

fn write_record(dir: &Path, file: &str, schema: &Schema, rec: &Record) -> Result<()> {
	debug!(file, "writing record");
	let text = render(&schema.export(rec));
	fs::write(dir.join(file), text)?;
	Ok(())
}

/// Pack an extracted directory back into `<dir>_new.sav`.
pub fn pack(dir: &Path) -> Result<PathBuf> {
	if !dir.is_dir() {
		return Err(SavError::NotADirectory { path: dir.display().to_string() });
	}
	info!(dir = %dir.display(), "packing savegame");

	let mut save = Savegame {
		header: read_record(dir, RECORD_FILES[0], &header_schema())?,
		mods: read_record(dir, RECORD_FILES[1], &mods_schema())?,
		settings: read_record(dir, RECORD_FILES[2], &settings_schema())?,
		after_settings: read_record(dir, RECORD_FILES[3], &after_settings_schema())?,
		model_rep: read_record(dir, RECORD_FILES[4], &model_rep_schema())?,
		remaining: fs::read(dir.join("remaining.data"))?,
	};

	let mut plain = Cursor::new(Vec::new());
	save.encode(&mut plain)?;
	let plain = plain.into_inner();
	debug!(bytes = plain.len(), "raw container encoded");

	let stage1 = compress_buffer(&plain)?;
	let packed = compress_buffer(&stage1)?;
	debug!(bytes = packed.len(), "compressed through two frame layers");

	let mut name = dir
		.file_name()
		.ok_or_else(|| SavError::NotADirectory { path: dir.display().to_string() })?
		.to_os_string();
	name.push("_new.sav");
	let out = dir.with_file_name(name);
	fs::write(&out, packed)?;
	info!(file = %out.display(), "savegame written");
	Ok(out)
}

fn read_record(dir: &Path, file: &str, schema: &Schema) -> Result<Record> {
	debug!(file, "importing record");
	let text = fs::read_to_string(dir.join(file))?;
	let root = parse(&text)?;
	schema.import(document_root(&root))
}
