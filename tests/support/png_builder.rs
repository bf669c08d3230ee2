//! Hand-assembled PNG files for inputs the `image` encoder cannot produce:
//! sub-byte depths, Adam7 interlacing, damaged streams.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use spritepng::png::chunk::write_chunk;
use spritepng::png::interlace::ADAM7;
use spritepng::png::PNG_SIGNATURE;

/// IHDR body.
pub fn ihdr(width: u32, height: u32, bit_depth: u8, color_type: u8, interlaced: bool) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[bit_depth, color_type, 0, 0, u8::from(interlaced)]);
    data
}

/// zlib-compress `raw`.
pub fn zlib(raw: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(raw).unwrap();
    enc.finish().unwrap()
}

/// Complete PNG: IHDR, `extra` chunks in order, one IDAT holding `raw`
/// (scanlines with their filter bytes), IEND.
pub fn assemble(header: &[u8], extra: &[(&[u8; 4], &[u8])], raw: &[u8]) -> Vec<u8> {
    let mut out = PNG_SIGNATURE.to_vec();
    write_chunk(&mut out, b"IHDR", header).unwrap();
    for (kind, data) in extra {
        write_chunk(&mut out, kind, data).unwrap();
    }
    write_chunk(&mut out, b"IDAT", &zlib(raw)).unwrap();
    write_chunk(&mut out, b"IEND", &[]).unwrap();
    out
}

/// Pack one row of samples at `bit_depth` (1, 2, 4, 8), MSB first, behind
/// a None filter byte.
pub fn packed_row(samples: &[u8], bit_depth: u8) -> Vec<u8> {
    let mut row = vec![0u8];
    if bit_depth == 8 {
        row.extend_from_slice(samples);
        return row;
    }
    let per_byte = (8 / bit_depth) as usize;
    for group in samples.chunks(per_byte) {
        let mut byte = 0u8;
        for (i, &s) in group.iter().enumerate() {
            byte |= s << (8 - bit_depth as usize * (i + 1));
        }
        row.push(byte);
    }
    row
}

/// Adam7 scanline data for a `width` x `height` image with `channels`
/// 8-bit samples per pixel, every row unfiltered.
pub fn adam7_raw(width: u32, height: u32, channels: usize, samples: &[u8]) -> Vec<u8> {
    let mut raw = Vec::new();
    for pass in &ADAM7 {
        let (pw, ph) = pass.size(width, height);
        if pw == 0 || ph == 0 {
            continue;
        }
        for j in 0..ph {
            raw.push(0);
            let y = pass.y_start + j * pass.y_step;
            for i in 0..pw {
                let x = pass.x_start + i * pass.x_step;
                let at = (y * width + x) as usize * channels;
                raw.extend_from_slice(&samples[at..at + channels]);
            }
        }
    }
    raw
}
