mod codec;
mod error;
mod frame;
mod parse;
mod record;
mod render;
mod savegame;
mod schema;
mod stream;
mod value;

/// Error and result aliases.
pub use error::{CodecStage, DecodeReason, ImportReason, SavError};
/// Crate-local result type.
pub use error::Result;
/// Frame compression wrapper entry points.
pub use frame::{compress_buffer, decompress_buffer};
/// Textual notation parser entry points.
pub use parse::{document_root, parse};
/// Decoded record value types.
pub use record::{Record, RecordField, Slot};
/// Textual notation writer entry points.
pub use render::{render, render_node};
/// Container pipelines and record schemas for the supported savegame format.
pub use savegame::{
	ExtractOptions, ExtractOutcome, Savegame, SaveSummary, derive_output_dir, extract, pack,
};
/// Record schema descriptor types.
pub use schema::{ByteOrder, Field, FieldKind, ScalarKind, Schema};
/// Value tree node types.
pub use value::{Node, NodeKind, NumStyle};
