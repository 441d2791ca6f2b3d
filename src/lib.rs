//! Public library API for converting savegame containers to editable text and back.

/// Value tree, textual notation, schema codec, and frame compression engine.
pub mod sav;
