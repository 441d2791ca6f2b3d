use std::path::PathBuf;

use savcodec::sav::{Result, pack};

/// Pack an extracted directory back into a savegame file.
pub fn run(dir: PathBuf) -> Result<()> {
	let out = pack(&dir)?;
	println!("packed: {}", out.display());
	Ok(())
}
