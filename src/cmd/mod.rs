/// Savegame extraction command.
pub mod extract;
/// Savegame summary command.
pub mod info;
/// Directory repack command.
pub mod pack;
