use std::path::PathBuf;

use savcodec::sav::{ExtractOptions, Result, extract};

/// Extract a savegame into a directory of editable text files.
pub fn run(path: PathBuf, force_dir: bool) -> Result<()> {
	let outcome = extract(&path, &ExtractOptions { force_dir })?;

	println!("extracted: {}", outcome.dir.display());
	println!("version: {:#x}", outcome.summary.version);
	println!("mods: {}", outcome.summary.mods.len());
	println!("remaining_bytes: {}", outcome.summary.remaining_bytes);
	Ok(())
}
