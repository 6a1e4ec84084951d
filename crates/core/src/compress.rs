// Path: crates/core/src/compress.rs

//! Bounded deflate helpers shared by the batch file codecs.

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Why an inflate attempt failed.
pub(crate) enum InflateFailure {
    /// The input is not a valid deflate stream.
    Malformed,
    /// The decompressed content exceeds the caller's limit.
    TooLarge,
}

/// Inflates a deflate stream, refusing to materialize more than
/// `max_bytes` of output. The cap is enforced while reading, so a
/// compression bomb costs at most `max_bytes` of memory.
pub(crate) fn inflate_bounded(bytes: &[u8], max_bytes: usize) -> Result<Vec<u8>, InflateFailure> {
    let decoder = DeflateDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .take(max_bytes as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|_| InflateFailure::Malformed)?;
    if out.len() > max_bytes {
        return Err(InflateFailure::TooLarge);
    }
    Ok(out)
}

/// Deflates a buffer at the default compression level.
pub(crate) fn deflate(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}
