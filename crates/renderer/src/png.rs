//! PNG encoding for RGBA image data.
//!
//! Chunks are assembled directly: IHDR, optional tEXt, a single zlib IDAT,
//! then IEND. Composites are continuous-tone, so only RGBA (color type 6)
//! is produced.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{RenderError, RenderResult};

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Create a PNG image from RGBA pixel data (color type 6).
///
/// # Arguments
/// - `pixels`: RGBA pixel data (4 bytes per pixel, row-major)
/// - `width`: Image width in pixels
/// - `height`: Image height in pixels
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    create_png_with_text(pixels, width, height, &[])
}

/// Like [`create_png`], with `tEXt` chunks for `(keyword, text)` pairs.
///
/// Keywords must be 1-79 printable ASCII characters; others are skipped.
/// Non-ASCII characters in the text are replaced with `?`.
pub fn create_png_with_text(
    pixels: &[u8],
    width: usize,
    height: usize,
    text: &[(&str, &str)],
) -> RenderResult<Vec<u8>> {
    let expected = width * height * 4;
    if width == 0 || height == 0 || pixels.len() != expected {
        return Err(RenderError::InvalidDimensions {
            width,
            height,
            expected,
            actual: pixels.len(),
        });
    }

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(6); // color type (RGBA)
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    for (keyword, value) in text {
        if let Some(data) = text_chunk_data(keyword, value) {
            write_chunk(&mut png, b"tEXt", &data);
        }
    }

    let idat_data = deflate_idat_rgba(pixels, width, height).map_err(RenderError::Encode)?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn text_chunk_data(keyword: &str, value: &str) -> Option<Vec<u8>> {
    let valid_keyword = (1..=79).contains(&keyword.len())
        && keyword.bytes().all(|b| (32..=126).contains(&b));
    if !valid_keyword {
        return None;
    }

    let mut data = Vec::with_capacity(keyword.len() + 1 + value.len());
    data.extend_from_slice(keyword.as_bytes());
    data.push(0);
    data.extend(value.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' }));
    Some(data)
}

/// Write a PNG chunk: length, type, data, CRC over type and data.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Deflate RGBA image data for the IDAT chunk.
fn deflate_idat_rgba(pixels: &[u8], width: usize, height: usize) -> std::io::Result<Vec<u8>> {
    // Add filter byte (0 = no filter) to each scanline
    let row_len = width * 4;
    let mut uncompressed = Vec::with_capacity(height * (1 + row_len));
    for row in pixels.chunks_exact(row_len) {
        uncompressed.push(0);
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}
