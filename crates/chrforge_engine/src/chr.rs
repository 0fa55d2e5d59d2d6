//! CHR codec: raster images into packed 2bpp planar tile data, and planar
//! tile data into renderable RGB bitmaps.

use std::io::Cursor;

use lazy_static::lazy_static;
use rgb::RGB8;

use crate::{EngineError, EngineResult, MASTER_PALETTE};

/// Tile edge in pixels.
pub const TILE_EDGE: usize = 8;
/// Two 8-byte bit planes per tile.
pub const BYTES_PER_TILE: usize = 16;
/// Cap on derived tile data: four banks of 256 tiles.
pub const CHR_DATA_CAP: usize = 256 * 4 * BYTES_PER_TILE;

/// Packed planar tile data plus the per-source-block index list.
///
/// `indices` holds, for every 8×8 source block in raster order, the running
/// count of emitted tiles *after* that block. Fully transparent blocks emit
/// no data and leave the count unchanged, so block `j` was skipped iff
/// `indices[j]` equals its predecessor (with an implicit leading 0); an
/// emitted block's data chunk is `indices[j] - 1`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChrPatterns {
    pub data: Vec<u8>,
    pub indices: Vec<u16>,
}

impl ChrPatterns {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.indices.is_empty()
    }

    /// Number of 8×8 source blocks the patterns describe.
    pub fn block_count(&self) -> usize {
        self.indices.len()
    }

    /// Wraps a raw planar tile file: every block is an emitted tile.
    /// Input is capped to [`CHR_DATA_CAP`] and truncated to whole tiles.
    pub fn from_raw(bytes: &[u8]) -> Self {
        let len = bytes.len().min(CHR_DATA_CAP);
        let len = len - len % BYTES_PER_TILE;
        let tiles = (len / BYTES_PER_TILE) as u16;
        ChrPatterns {
            data: bytes[..len].to_vec(),
            indices: (1..=tiles).collect(),
        }
    }
}

/// A 2-bit-quantized raster with per-pixel transparency, the codec's
/// intermediate form between image decode and plane packing.
#[derive(Clone, Debug)]
pub struct QuantizedImage {
    pub width: usize,
    pub height: usize,
    /// One 2-bit index per pixel.
    pub pixels: Vec<u8>,
    pub transparent: Vec<bool>,
}

/// Packs a quantized raster into planar tiles.
///
/// For every 8×8 block in raster order: a fully transparent block contributes
/// no bytes, any other block contributes its low plane then its high plane,
/// one byte per row, MSB = leftmost pixel.
pub fn pack_tiles(image: &QuantizedImage) -> EngineResult<ChrPatterns> {
    if image.width % TILE_EDGE != 0 || image.height % TILE_EDGE != 0 {
        return Err(EngineError::ImageDimensions {
            width: image.width as u32,
            height: image.height as u32,
        });
    }

    let mut data = Vec::with_capacity(image.pixels.len() / 4);
    let mut indices = Vec::with_capacity(image.pixels.len() / (TILE_EDGE * TILE_EDGE));
    let mut emitted: u16 = 0;

    for ty in (0..image.height).step_by(TILE_EDGE) {
        for tx in (0..image.width).step_by(TILE_EDGE) {
            let mut all_transparent = true;
            for y in 0..TILE_EDGE {
                for x in 0..TILE_EDGE {
                    if !image.transparent[tx + x + (ty + y) * image.width] {
                        all_transparent = false;
                    }
                }
            }

            if !all_transparent {
                for y in 0..TILE_EDGE {
                    let mut value = 0u8;
                    for x in 0..TILE_EDGE {
                        value |= (image.pixels[tx + x + (ty + y) * image.width] & 1) << (7 - x);
                    }
                    data.push(value);
                }
                for y in 0..TILE_EDGE {
                    let mut value = 0u8;
                    for x in 0..TILE_EDGE {
                        value |= ((image.pixels[tx + x + (ty + y) * image.width] >> 1) & 1) << (7 - x);
                    }
                    data.push(value);
                }
                emitted += 1;
            }

            indices.push(emitted);
        }
    }

    Ok(ChrPatterns { data, indices })
}

/// Decodes a PNG into planar tiles with palette quantization and
/// transparency tracking.
///
/// Indexed images keep the palette entries with alpha ≥ 128, renumbered from
/// 0; pixels of dropped entries are transparent. Grayscale and RGB images
/// without alpha quantize the first channel's top two bits and are fully
/// opaque. Images with alpha quantize the first channel and mark alpha < 128
/// transparent.
pub fn png_to_tiles(bytes: &[u8]) -> EngineResult<ChrPatterns> {
    let image = quantize_png(bytes)?;
    pack_tiles(&image)
}

fn quantize_png(bytes: &[u8]) -> EngineResult<QuantizedImage> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;

    let info = reader.info();
    let width = info.width as usize;
    let height = info.height as usize;
    let color_type = info.color_type;
    let bit_depth = info.bit_depth;
    let palette: Option<Vec<u8>> = info.palette.as_ref().map(|p| p.to_vec());
    let trns: Option<Vec<u8>> = info.trns.as_ref().map(|t| t.to_vec());

    if width % TILE_EDGE != 0 || height % TILE_EDGE != 0 {
        return Err(EngineError::ImageDimensions {
            width: width as u32,
            height: height as u32,
        });
    }

    let buffer_size = reader
        .output_buffer_size()
        .ok_or_else(|| EngineError::invalid_png("output buffer size unknown"))?;
    let mut buffer = vec![0u8; buffer_size];
    let frame = reader.next_frame(&mut buffer)?;
    buffer.truncate(frame.buffer_size());

    let pixel_count = width * height;
    match color_type {
        png::ColorType::Indexed => {
            let samples = unpack_samples(&buffer, width, height, bit_depth)?;
            let palette = palette.ok_or_else(|| EngineError::invalid_png("indexed image without a palette"))?;
            let entries = palette.len() / 3;

            // Opaque palette entries, in order; position = renumbered index.
            let mut kept = Vec::new();
            for entry in 0..entries {
                let alpha = trns.as_ref().and_then(|t| t.get(entry)).copied().unwrap_or(255);
                if alpha >= 128 {
                    kept.push(entry as u8);
                }
            }

            let mut pixels = Vec::with_capacity(pixel_count);
            let mut transparent = Vec::with_capacity(pixel_count);
            for &sample in &samples {
                match kept.iter().position(|&k| k == sample) {
                    Some(index) => {
                        pixels.push(index as u8);
                        transparent.push(false);
                    }
                    None => {
                        pixels.push(0);
                        transparent.push(true);
                    }
                }
            }
            Ok(QuantizedImage {
                width,
                height,
                pixels,
                transparent,
            })
        }
        png::ColorType::Grayscale => {
            let samples = unpack_samples(&buffer, width, height, bit_depth)?;
            let max = (1u32 << bit_depth as u8) - 1;
            let pixels = samples.iter().map(|&v| ((u32::from(v) * 255 / max) >> 6) as u8).collect();
            Ok(QuantizedImage {
                width,
                height,
                pixels,
                transparent: vec![false; pixel_count],
            })
        }
        png::ColorType::Rgb => {
            // Deliberately identical to grayscale: only the first channel's
            // top two bits matter.
            require_eight_bit(bit_depth)?;
            let pixels = buffer.chunks_exact(3).map(|px| px[0] >> 6).collect();
            Ok(QuantizedImage {
                width,
                height,
                pixels,
                transparent: vec![false; pixel_count],
            })
        }
        png::ColorType::GrayscaleAlpha => {
            require_eight_bit(bit_depth)?;
            let pixels = buffer.chunks_exact(2).map(|px| px[0] >> 6).collect();
            let transparent = buffer.chunks_exact(2).map(|px| px[1] < 128).collect();
            Ok(QuantizedImage {
                width,
                height,
                pixels,
                transparent,
            })
        }
        png::ColorType::Rgba => {
            require_eight_bit(bit_depth)?;
            let pixels = buffer.chunks_exact(4).map(|px| px[0] >> 6).collect();
            let transparent = buffer.chunks_exact(4).map(|px| px[3] < 128).collect();
            Ok(QuantizedImage {
                width,
                height,
                pixels,
                transparent,
            })
        }
        #[allow(unreachable_patterns)]
        other => Err(EngineError::invalid_png(format!("unsupported color type {other:?}"))),
    }
}

fn require_eight_bit(bit_depth: png::BitDepth) -> EngineResult<()> {
    if bit_depth == png::BitDepth::Eight {
        Ok(())
    } else {
        Err(EngineError::UnsupportedBitDepth { bits: bit_depth as u8 })
    }
}

/// Expands MSB-first packed single-channel scanlines (row-padded to whole
/// bytes) into one sample per pixel.
fn unpack_samples(buffer: &[u8], width: usize, height: usize, bit_depth: png::BitDepth) -> EngineResult<Vec<u8>> {
    let bits = match bit_depth {
        png::BitDepth::One => 1,
        png::BitDepth::Two => 2,
        png::BitDepth::Four => 4,
        png::BitDepth::Eight => return Ok(buffer[..width * height].to_vec()),
        #[allow(unreachable_patterns)]
        _ => return Err(EngineError::UnsupportedBitDepth { bits: 16 }),
    };

    let row_bytes = (width * bits + 7) / 8;
    let mask = (1u16 << bits) as u8 - 1;
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = &buffer[y * row_bytes..(y + 1) * row_bytes];
        for x in 0..width {
            let bit = x * bits;
            let shift = 8 - bits - (bit % 8);
            out.push((row[bit / 8] >> shift) & mask);
        }
    }
    Ok(out)
}

/// One renderable 8×8 RGB tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RgbTile {
    pub pixels: [RGB8; TILE_EDGE * TILE_EDGE],
}

impl Default for RgbTile {
    fn default() -> Self {
        RgbTile {
            pixels: [RGB8 { r: 0, g: 0, b: 0 }; TILE_EDGE * TILE_EDGE],
        }
    }
}

/// A tile rendered through each of the four palette sub-rows.
pub type TileBitmaps = [RgbTile; 4];

const PLACEHOLDER_COLORS: [RGB8; 4] = [
    RGB8 { r: 0x39, g: 0x00, b: 0x00 },
    RGB8 { r: 0x00, g: 0x39, b: 0x39 },
    RGB8 { r: 0x00, g: 0x00, b: 0x39 },
    RGB8 { r: 0x39, g: 0x00, b: 0x39 },
];

const PLACEHOLDER_PATTERN: [[u8; 8]; 8] = [
    [0, 0, 1, 1, 1, 1, 2, 2],
    [0, 0, 0, 1, 1, 2, 2, 2],
    [1, 0, 0, 0, 2, 2, 2, 1],
    [1, 1, 0, 3, 3, 2, 1, 1],
    [1, 1, 2, 3, 3, 0, 1, 1],
    [1, 2, 2, 2, 0, 0, 0, 1],
    [2, 2, 2, 1, 1, 0, 0, 0],
    [2, 2, 1, 1, 1, 1, 0, 0],
];

lazy_static! {
    static ref PLACEHOLDER: TileBitmaps = {
        let mut tile = RgbTile::default();
        for y in 0..TILE_EDGE {
            for x in 0..TILE_EDGE {
                tile.pixels[y * TILE_EDGE + x] = PLACEHOLDER_COLORS[PLACEHOLDER_PATTERN[y][x] as usize];
            }
        }
        [tile; 4]
    };
}

/// The fixed "no tile here" bitmap set.
pub fn placeholder_tiles() -> TileBitmaps {
    *PLACEHOLDER
}

/// Renders planar tile data through a 16-entry palette, producing one bitmap
/// set per source block ordinal. Skipped blocks and blocks whose data lies
/// past the end get the placeholder.
pub fn tiles_to_bitmaps(patterns: &ChrPatterns, palette: &[u8; 16]) -> Vec<TileBitmaps> {
    let mut out = Vec::with_capacity(patterns.indices.len());
    let mut previous: u16 = 0;

    for &index in &patterns.indices {
        if index == previous {
            out.push(placeholder_tiles());
            continue;
        }
        previous = index;

        let chunk = (index as usize - 1) * BYTES_PER_TILE;
        if chunk + BYTES_PER_TILE > patterns.data.len() {
            out.push(placeholder_tiles());
            continue;
        }
        let plane0 = &patterns.data[chunk..chunk + TILE_EDGE];
        let plane1 = &patterns.data[chunk + TILE_EDGE..chunk + BYTES_PER_TILE];

        let mut bitmaps = TileBitmaps::default();
        for y in 0..TILE_EDGE {
            for x in 0..TILE_EDGE {
                let rx = 7 - x;
                let entry = ((plane0[y] >> rx) & 1) | (((plane1[y] >> rx) & 1) << 1);
                for (sub, bitmap) in bitmaps.iter_mut().enumerate() {
                    let code = palette[entry as usize + sub * 4] % 64;
                    bitmap.pixels[y * TILE_EDGE + x] = MASTER_PALETTE[code as usize];
                }
            }
        }
        out.push(bitmaps);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque_image(pixels: Vec<u8>, width: usize, height: usize) -> QuantizedImage {
        QuantizedImage {
            width,
            height,
            transparent: vec![false; pixels.len()],
            pixels,
        }
    }

    #[test]
    fn test_pack_single_opaque_tile() {
        let mut pixels = vec![0u8; 64];
        pixels[0] = 0b11; // top-left pixel
        pixels[7] = 0b01; // top-right pixel
        let patterns = pack_tiles(&opaque_image(pixels, 8, 8)).unwrap();

        assert_eq!(patterns.data.len(), BYTES_PER_TILE);
        assert_eq!(patterns.indices, vec![1]);
        // low plane, row 0: leftmost and rightmost pixels set
        assert_eq!(patterns.data[0], 0b1000_0001);
        // high plane, row 0: only the leftmost pixel has bit 1 set
        assert_eq!(patterns.data[8], 0b1000_0000);
    }

    #[test]
    fn test_pack_skips_fully_transparent_block() {
        let image = QuantizedImage {
            width: 16,
            height: 8,
            pixels: vec![1; 128],
            transparent: (0..128).map(|i| i % 16 < 8).collect(),
        };
        let patterns = pack_tiles(&image).unwrap();
        // left block fully transparent: no bytes, counter not advanced
        assert_eq!(patterns.data.len(), BYTES_PER_TILE);
        assert_eq!(patterns.indices, vec![0, 1]);
    }

    #[test]
    fn test_pack_keeps_partially_transparent_block() {
        let mut transparent = vec![false; 64];
        transparent[0] = true;
        let image = QuantizedImage {
            width: 8,
            height: 8,
            pixels: vec![2; 64],
            transparent,
        };
        let patterns = pack_tiles(&image).unwrap();
        assert_eq!(patterns.data.len(), BYTES_PER_TILE);
        assert_eq!(patterns.indices, vec![1]);
        // the transparent pixel still carries its quantized value
        assert_eq!(patterns.data[8], 0xFF);
    }

    #[test]
    fn test_pack_rejects_unaligned_dimensions() {
        let image = opaque_image(vec![0; 10 * 8], 10, 8);
        assert!(matches!(pack_tiles(&image), Err(EngineError::ImageDimensions { width: 10, height: 8 })));
    }

    #[test]
    fn test_from_raw_identity_indices() {
        let bytes = vec![0xAB; BYTES_PER_TILE * 3 + 5];
        let patterns = ChrPatterns::from_raw(&bytes);
        assert_eq!(patterns.data.len(), BYTES_PER_TILE * 3);
        assert_eq!(patterns.indices, vec![1, 2, 3]);

        // every raw block renders as a real tile, never the placeholder
        let bitmaps = tiles_to_bitmaps(&patterns, &[0u8; 16]);
        assert_eq!(bitmaps.len(), 3);
        assert!(bitmaps.iter().all(|b| *b != placeholder_tiles()));
    }

    #[test]
    fn test_bitmaps_roundtrip_pixel() {
        let mut pixels = vec![0u8; 64];
        pixels[9] = 0b10;
        let patterns = pack_tiles(&opaque_image(pixels, 8, 8)).unwrap();

        let mut palette = [0u8; 16];
        palette[2] = 0x20; // entry 2 of sub-palette 0 -> white-ish
        let bitmaps = tiles_to_bitmaps(&patterns, &palette);
        assert_eq!(bitmaps.len(), 1);
        assert_eq!(bitmaps[0][0].pixels[9], MASTER_PALETTE[0x20]);
        assert_eq!(bitmaps[0][0].pixels[0], MASTER_PALETTE[0]);
    }

    #[test]
    fn test_bitmaps_substitute_placeholder_for_skipped_blocks() {
        let patterns = ChrPatterns {
            data: vec![0; BYTES_PER_TILE],
            indices: vec![0, 1, 1],
        };
        let palette = [0u8; 16];
        let bitmaps = tiles_to_bitmaps(&patterns, &palette);
        assert_eq!(bitmaps.len(), 3);
        assert_eq!(bitmaps[0], placeholder_tiles());
        assert_ne!(bitmaps[1], placeholder_tiles());
        assert_eq!(bitmaps[2], placeholder_tiles());
    }

    #[test]
    fn test_unpack_two_bit_rows() {
        // 4 pixels per byte, two rows of 5 pixels -> 2 bytes per row
        let buffer = vec![0b11_01_00_10, 0b01_000000, 0b00_10_11_01, 0b10_000000];
        let samples = unpack_samples(&buffer, 5, 2, png::BitDepth::Two).unwrap();
        assert_eq!(samples, vec![3, 1, 0, 2, 1, 0, 2, 3, 1, 2]);
    }
}
