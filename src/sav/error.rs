use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, SavError>;

/// Why a binary decode failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeReason {
	/// The stream ended before the field was fully read.
	Truncated,
	/// A decoded count or value does not fit its representable range.
	OutOfRange,
}

impl DecodeReason {
	/// Render the reason as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Truncated => "truncated input",
			Self::OutOfRange => "value out of representable range",
		}
	}
}

/// Why a tree import failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportReason {
	/// The tree has no member for a schema field.
	MissingField,
	/// The member exists but has the wrong node kind.
	TypeMismatch,
}

impl ImportReason {
	/// Render the reason as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::MissingField => "missing field",
			Self::TypeMismatch => "type mismatch",
		}
	}
}

/// Frame codec call that reported an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecStage {
	/// Compression header emission.
	Begin,
	/// Whole-source compression pass.
	Update,
	/// Trailer flush.
	End,
	/// Chunked decompression call.
	Decompress,
}

impl CodecStage {
	/// Render the stage as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Begin => "begin",
			Self::Update => "update",
			Self::End => "end",
			Self::Decompress => "decompress",
		}
	}
}

/// Errors produced while parsing, decoding, importing, and recompressing savegame data.
#[derive(Debug, Error)]
pub enum SavError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Textual notation syntax violation.
	#[error("parse error at line {line}: {message} >>>{snippet}<<<")]
	Parse {
		/// 1-based line number of the offending input.
		line: u32,
		/// Bounded slice of the input surrounding the error.
		snippet: String,
		/// Human-readable description of the violation.
		message: String,
	},
	/// Binary record decode failure.
	#[error("decode error at {path}: {}", reason.as_str())]
	Decode {
		/// Dotted field path of the offending field.
		path: String,
		/// Failure classification.
		reason: DecodeReason,
	},
	/// Tree-to-record import failure.
	#[error("import error at {path}: {}", reason.as_str())]
	Import {
		/// Dotted field path of the offending field.
		path: String,
		/// Failure classification.
		reason: ImportReason,
	},
	/// Frame codec reported a terminal error.
	#[error("frame codec error in {}: {message}", stage.as_str())]
	Codec {
		/// Codec call that failed.
		stage: CodecStage,
		/// Error text reported by the codec.
		message: String,
	},
	/// Unknown leading container magic.
	#[error("unknown container magic {magic:?}, expected a frame-compressed or raw savegame")]
	UnknownMagic {
		/// First up-to-4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Raw container signature missing after decompression.
	#[error("savegame signature not found, is this a valid savegame?")]
	BadSignature,
	/// Container version is not the supported one.
	#[error("unsupported savegame version {found:#x} (expected {expected:#x})")]
	UnsupportedVersion {
		/// Version the codec supports.
		expected: u32,
		/// Version read from the container.
		found: u32,
	},
	/// Pack source is not a directory.
	#[error("not a directory: {path}")]
	NotADirectory {
		/// Offending path.
		path: String,
	},
	/// Output directory probing exhausted all candidate names.
	#[error("output directory {base} exists and all fallback names are taken")]
	OutputDirExhausted {
		/// Base directory name derived from the input file.
		base: String,
	},
}
