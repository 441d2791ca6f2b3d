use std::path::PathBuf;

use savcodec::sav::{Result, SavError, Savegame};

/// Print a savegame summary as text or JSON.
pub fn run(path: PathBuf, json: bool) -> Result<()> {
	let save = Savegame::load(&path)?;
	let summary = save.summary();

	if json {
		let text = serde_json::to_string_pretty(&summary)
			.map_err(|e| SavError::Io(std::io::Error::other(e)))?;
		println!("{text}");
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("version: {:#x}", summary.version);
	println!("difficulty: {}", summary.difficulty);
	println!("start_year: {}", summary.start_year);
	println!("num_tiles: {}", summary.num_tiles);
	println!("date: {:#010x}", summary.date);
	println!("money: {}", summary.money);
	println!("achievements_earnable: {}", summary.achievements_earnable);
	println!("settings_entries: {}", summary.settings_entries);
	println!("model_entries: {}", summary.model_entries);
	println!("remaining_bytes: {}", summary.remaining_bytes);
	println!("mods:");
	for name in &summary.mods {
		println!("  {name}");
	}
	Ok(())
}
