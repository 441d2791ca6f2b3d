//! LZ4 frame compression wrapper with the container's fixed frame settings.
//!
//! The container pins its frame parameters: 256 KiB blocks, independently
//! decodable, whole-content checksum, per-block checksums, content size
//! omitted from the header. Decompression writes into one growable buffer,
//! growing by 128 MiB whenever headroom falls to the high-water mark.

use std::io::{Read, Write};

use lz4_flex::frame::{BlockMode, BlockSize, FrameDecoder, FrameEncoder, FrameInfo};

use crate::sav::error::{CodecStage, Result, SavError};

/// Growth increment and remaining-headroom high-water mark.
const GROWTH_STEP: usize = 128 * 1024 * 1024;

fn codec_err(stage: CodecStage, err: impl std::fmt::Display) -> SavError {
	SavError::Codec { stage, message: err.to_string() }
}

fn frame_info() -> FrameInfo {
	FrameInfo::new()
		.block_size(BlockSize::Max256KB)
		.block_mode(BlockMode::Independent)
		.block_checksums(true)
		.content_checksum(true)
}

/// Compress the whole source into a single LZ4 frame.
pub fn compress_buffer(src: &[u8]) -> Result<Vec<u8>> {
	let dst = Vec::with_capacity(src.len() / 2 + 64);
	let mut enc = FrameEncoder::with_frame_info(frame_info(), dst);
	enc.write_all(src).map_err(|e| codec_err(CodecStage::Update, e))?;
	enc.finish().map_err(|e| codec_err(CodecStage::End, e))
}

/// Decompress a single LZ4 frame, growing the destination as needed.
///
/// The initial capacity is the source length, a heuristic lower bound for
/// data that compressed at all.
pub fn decompress_buffer(src: &[u8]) -> Result<Vec<u8>> {
	decompress_with_capacity(src, src.len())
}

/// Decompression driver with an explicit starting capacity.
///
/// On a codec error the accumulated destination is dropped, never returned.
pub(crate) fn decompress_with_capacity(src: &[u8], initial: usize) -> Result<Vec<u8>> {
	let mut dec = FrameDecoder::new(src);
	let mut dst = vec![0u8; initial];
	let mut written = 0usize;
	loop {
		if dst.len() - written <= GROWTH_STEP {
			dst.resize(dst.len() + GROWTH_STEP, 0);
		}
		let n = dec
			.read(&mut dst[written..])
			.map_err(|e| codec_err(CodecStage::Decompress, e))?;
		if n == 0 {
			break;
		}
		written += n;
	}
	dst.truncate(written);
	Ok(dst)
}

#[cfg(test)]
mod tests {
	use super::{GROWTH_STEP, compress_buffer, decompress_buffer, decompress_with_capacity};
	use crate::sav::error::{CodecStage, SavError};

	#[test]
	fn buffers_roundtrip() {
		let data: Vec<u8> = (0..100_000u32).flat_map(u32::to_le_bytes).collect();
		let packed = compress_buffer(&data).unwrap();
		assert!(packed.len() < data.len());
		assert_eq!(decompress_buffer(&packed).unwrap(), data);
	}

	#[test]
	fn frames_start_with_the_lz4_magic() {
		let packed = compress_buffer(b"hello").unwrap();
		assert_eq!(packed[..4], 0x184D_2204u32.to_le_bytes());
	}

	#[test]
	fn corrupt_checksum_is_a_codec_error_not_output() {
		let mut packed = compress_buffer(b"some compressible payload, repeated: abcabcabc").unwrap();
		// The content checksum occupies the last 4 bytes of the frame.
		let last = packed.len() - 1;
		packed[last] ^= 0xFF;

		match decompress_buffer(&packed).unwrap_err() {
			SavError::Codec { stage, .. } => assert_eq!(stage, CodecStage::Decompress),
			other => panic!("unexpected error {other}"),
		}
	}

	#[test]
	fn grown_output_matches_a_presized_buffer() {
		// ~300 MiB of zeros decompresses through several growth steps when
		// starting from the tiny compressed length.
		let plain_len = 300 * 1024 * 1024;
		let packed = compress_buffer(&vec![0u8; plain_len]).unwrap();
		assert!(packed.len() < plain_len / 64);

		let grown = decompress_with_capacity(&packed, packed.len()).unwrap();
		let presized = decompress_with_capacity(&packed, plain_len + GROWTH_STEP).unwrap();
		assert_eq!(grown.len(), plain_len);
		assert_eq!(grown, presized);
	}
}
