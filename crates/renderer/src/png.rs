//! PNG export of rendered rasters.
//!
//! A colorized heatmap only ever contains gradient table entries plus
//! transparent pixels, so it normally fits in a 256-color palette and is
//! written as an indexed PNG (color type 3). Anything with more colors falls
//! back to plain RGBA (color type 6).

use std::collections::HashMap;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use heatmap_common::{HeatmapError, HeatmapResult};
use rayon::prelude::*;

use crate::surface::RenderSurface;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG
const MAX_PALETTE_SIZE: usize = 256;

/// Below this many pixels palette extraction runs on one thread
const PARALLEL_THRESHOLD: usize = 4096;

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

/// Encode a surface's current raster.
pub fn encode_surface<S: RenderSurface + ?Sized>(surface: &S) -> HeatmapResult<Vec<u8>> {
    let mut pixels = vec![0u8; surface.byte_len()];
    surface.read_pixels(&mut pixels)?;
    encode(&pixels, surface.width(), surface.height())
}

/// Encode unpremultiplied RGBA `pixels`, choosing indexed output when the
/// image has at most 256 distinct colors.
pub fn encode(pixels: &[u8], width: u32, height: u32) -> HeatmapResult<Vec<u8>> {
    check_len(pixels.len(), width, height, 4)?;

    let palette = if pixels.len() / 4 >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette(pixels)
    };

    match palette {
        Some((palette, indices)) => encode_indexed(width, height, &palette, &indices),
        None => encode_rgba(pixels, width, height),
    }
}

/// Encode as an RGBA PNG.
pub fn encode_rgba(pixels: &[u8], width: u32, height: u32) -> HeatmapResult<Vec<u8>> {
    check_len(pixels.len(), width, height, 4)?;
    let idat = deflate_scanlines(pixels, width as usize * 4)?;

    let mut png = Vec::with_capacity(idat.len() + 64);
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, COLOR_TYPE_RGBA));
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode palette `indices` as an indexed PNG. A `tRNS` chunk is added when
/// any palette entry is not fully opaque.
pub fn encode_indexed(
    width: u32,
    height: u32,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> HeatmapResult<Vec<u8>> {
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(HeatmapError::Encode(format!(
            "palette must hold 1 to {} colors, got {}",
            MAX_PALETTE_SIZE,
            palette.len()
        )));
    }
    check_len(indices.len(), width, height, 1)?;
    let idat = deflate_scanlines(indices, width as usize)?;

    let mut png = Vec::with_capacity(idat.len() + palette.len() * 4 + 64);
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, COLOR_TYPE_INDEXED));

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn check_len(len: usize, width: u32, height: u32, bytes_per_pixel: usize) -> HeatmapResult<()> {
    let expected = width as usize * height as usize * bytes_per_pixel;
    if len != expected {
        return Err(HeatmapError::SurfaceSizeMismatch {
            expected,
            actual: len,
        });
    }
    if width == 0 || height == 0 {
        return Err(HeatmapError::Encode(format!(
            "cannot encode a {}x{} image",
            width, height
        )));
    }
    Ok(())
}

fn ihdr(width: u32, height: u32, color_type: u8) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&width.to_be_bytes());
    data[4..8].copy_from_slice(&height.to_be_bytes());
    data[8] = 8; // bit depth
    data[9] = color_type;
    // compression, filter and interlace methods stay 0
    data
}

/// Prefix each row with filter type 0 and zlib-compress the result.
fn deflate_scanlines(data: &[u8], row_len: usize) -> HeatmapResult<Vec<u8>> {
    let rows = data.len() / row_len.max(1);
    let mut raw = Vec::with_capacity(rows * (row_len + 1));
    for row in data.chunks_exact(row_len) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(&raw).map_err(compression_error)?;
    encoder.finish().map_err(compression_error)
}

fn compression_error(e: std::io::Error) -> HeatmapError {
    HeatmapError::Encode(format!("IDAT compression failed: {}", e))
}

fn write_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(kind);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[inline(always)]
fn pack(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

type Palette = (Vec<[u8; 4]>, Vec<u8>);

fn extract_palette(pixels: &[u8]) -> Option<Palette> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = pack(px);
        let index = match lookup.get(&key) {
            Some(&i) => i,
            None => {
                if palette.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                let i = palette.len() as u8;
                palette.push(key.to_le_bytes());
                lookup.insert(key, i);
                i
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Collect distinct colors per chunk in parallel, merge, then map pixels to
/// indices in parallel.
fn extract_palette_parallel(pixels: &[u8]) -> Option<Palette> {
    let chunk_pixels = (pixels.len() / 4 / rayon::current_num_threads()).max(256);

    let distinct: Vec<u32> = pixels
        .par_chunks(chunk_pixels * 4)
        .flat_map_iter(|chunk| {
            let mut seen: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                seen.insert(pack(px), ());
                if seen.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            seen.into_keys()
        })
        .collect();

    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    for key in distinct {
        if lookup.contains_key(&key) {
            continue;
        }
        if palette.len() == MAX_PALETTE_SIZE {
            return None;
        }
        lookup.insert(key, palette.len() as u8);
        palette.push(key.to_le_bytes());
    }

    let indices = pixels
        .par_chunks_exact(4)
        .map(|px| lookup.get(&pack(px)).copied().unwrap_or(0))
        .collect();

    Some((palette, indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_reuses_indices() {
        let pixels = [
            255, 0, 0, 255, //
            0, 0, 0, 0, //
            255, 0, 0, 255,
        ];
        let (palette, indices) = extract_palette(&pixels).unwrap();
        assert_eq!(palette, vec![[255, 0, 0, 255], [0, 0, 0, 0]]);
        assert_eq!(indices, vec![0, 1, 0]);
    }

    #[test]
    fn test_palette_overflow() {
        let pixels: Vec<u8> = (0..300u32).flat_map(|i| [i as u8, (i >> 8) as u8, 0, 255]).collect();
        assert!(extract_palette(&pixels).is_none());
        assert!(extract_palette_parallel(&pixels).is_none());
    }

    #[test]
    fn test_parallel_matches_sequential_colors() {
        let pixels: Vec<u8> = (0..128 * 128u32)
            .flat_map(|i| [(i % 40) as u8 * 6, 0, 255, 200])
            .collect();
        let (seq, _) = extract_palette(&pixels).unwrap();
        let (par, indices) = extract_palette_parallel(&pixels).unwrap();
        assert_eq!(seq.len(), 40);
        assert_eq!(par.len(), 40);
        for (px, &i) in pixels.chunks_exact(4).zip(&indices) {
            assert_eq!(&par[i as usize], px);
        }
    }

    #[test]
    fn test_ihdr_layout() {
        let data = ihdr(300, 2, COLOR_TYPE_RGBA);
        assert_eq!(&data[0..4], &300u32.to_be_bytes());
        assert_eq!(&data[4..8], &2u32.to_be_bytes());
        assert_eq!(&data[8..], &[8, 6, 0, 0, 0]);
    }
}
