//! Collision-mask sheet loading: slices a source raster into the fixed 4×64
//! catalog of collision tile bitmaps.

use image::GenericImageView;
use rgb::RGB8;

use crate::{EngineResult, Position, Rectangle};

/// Columns × rows of the collision picker catalog.
pub const COLLISION_SHEET_COLUMNS: u32 = 4;
pub const COLLISION_SHEET_ROWS: u32 = 64;

/// Fill color for sheet pixels outside the source image.
const PAD_COLOR: RGB8 = RGB8 { r: 255, g: 0, b: 255 };

/// One collision tile bitmap of edge `8 × scale` pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionTile {
    pub edge: u32,
    pub pixels: Vec<RGB8>,
}

/// Decodes a collision-mask raster and slices it into the 256 catalog tiles
/// at the given scale. An empty input or zero scale yields no tiles.
pub fn load_collision_mask(bytes: &[u8], scale: u32) -> EngineResult<Vec<CollisionTile>> {
    if bytes.is_empty() || scale == 0 {
        return Ok(Vec::new());
    }
    let image = image::load_from_memory(bytes)?;
    Ok(slice_collision_sheet(&image, scale))
}

/// Cuts the sheet into `4 × 64` tiles of edge `8 × scale`, padding cells
/// outside the image with magenta.
pub fn slice_collision_sheet(image: &image::DynamicImage, scale: u32) -> Vec<CollisionTile> {
    let edge = 8 * scale;
    let (width, height) = image.dimensions();
    let rgb = image.to_rgb8();

    let sheet = Rectangle::from_min_size((0, 0), (COLLISION_SHEET_COLUMNS as i32, COLLISION_SHEET_ROWS as i32));
    let mut tiles = Vec::with_capacity(sheet.get_size().area());
    for cell in sheet.positions() {
        let origin = Position::new(cell.x * edge as i32, cell.y * edge as i32);
        let mut pixels = Vec::with_capacity((edge * edge) as usize);
        for y in 0..edge {
            for x in 0..edge {
                let sx = origin.x + x as i32;
                let sy = origin.y + y as i32;
                if sx >= 0 && sy >= 0 && (sx as u32) < width && (sy as u32) < height {
                    let px = rgb.get_pixel(sx as u32, sy as u32);
                    pixels.push(RGB8 {
                        r: px[0],
                        g: px[1],
                        b: px[2],
                    });
                } else {
                    pixels.push(PAD_COLOR);
                }
            }
        }
        tiles.push(CollisionTile { edge, pixels });
    }
    tiles
}
