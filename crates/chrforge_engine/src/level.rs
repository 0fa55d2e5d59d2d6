use std::collections::{BTreeMap, HashMap};

use crate::chr::{tiles_to_bitmaps, TileBitmaps};
use crate::{ChrSource, ChrTiles, CollisionTiles, Object, Position, Size, TileLayer};

/// CHR picker layout: 16 tiles per row across four 256-tile pages.
pub const CHR_PICKER_SIZE: Size = Size { width: 16, height: 64 };
/// Collision picker layout: the 4×64 mask catalog.
pub const COLLISION_PICKER_SIZE: Size = Size { width: 4, height: 64 };
/// Canvas size of a freshly created level.
pub const DEFAULT_LEVEL_SIZE: Size = Size { width: 24, height: 24 };

/// One level: a graphics canvas, a coarser collision canvas and the placed
/// objects. Object order is significant; it is the index the undo commands
/// and the persisted form refer to.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub name: String,
    pub macro_name: String,
    /// CHR source referenced by name (weak, resolved by lookup).
    pub chr_name: String,
    pub palette_index: u8,
    pub chr_layer: TileLayer<ChrTiles>,
    pub collision_layer: TileLayer<CollisionTiles>,
    pub objects: Vec<Object>,
    /// Derived per-bank render bitmaps, rebuilt by [`Level::refresh_chr`].
    pub chr_bitmaps: HashMap<u16, Vec<TileBitmaps>>,
}

impl Default for Level {
    fn default() -> Self {
        Level::new("level")
    }
}

impl Level {
    pub fn new(name: impl Into<String>) -> Self {
        Level {
            name: name.into(),
            macro_name: String::new(),
            chr_name: String::new(),
            palette_index: 0,
            chr_layer: TileLayer::new(ChrTiles::default(), CHR_PICKER_SIZE, DEFAULT_LEVEL_SIZE),
            collision_layer: TileLayer::new(CollisionTiles, COLLISION_PICKER_SIZE, DEFAULT_LEVEL_SIZE),
            objects: Vec::new(),
            chr_bitmaps: HashMap::new(),
        }
    }

    pub fn get_size(&self) -> Size {
        self.chr_layer.canvas_size()
    }

    /// Resizes both canvases; the collision size is the project's
    /// coarser-density mapping of `size`.
    pub fn resize(&mut self, size: Size, collision_size: Size) {
        self.chr_layer.resize_canvas(size);
        self.collision_layer.resize_canvas(collision_size);
    }

    pub fn clear_chr_bitmaps(&mut self) {
        self.chr_bitmaps.clear();
    }

    /// Rebuilds the per-bank render bitmaps from the given CHR sources and
    /// 16-entry palette.
    pub fn refresh_chr(&mut self, sources: &[ChrSource], palette: &[u8; 16]) {
        self.chr_bitmaps.clear();
        for source in sources {
            self.chr_bitmaps.insert(source.id, tiles_to_bitmaps(&source.patterns, palette));
        }
    }

    /// Counts distinct (tile sequence, collision value) metatiles of edge
    /// `metatile_size`, zero-padding past the canvas edges. With a threshold,
    /// additionally selects every cell of each block whose pair occurs at or
    /// below it (clearing the canvas selection first).
    pub fn count_metatiles(&mut self, metatile_size: u32, select_threshold: Option<u32>) -> usize {
        let edge = metatile_size as i32;
        if edge <= 0 {
            return 0;
        }

        if select_threshold.is_some() {
            self.chr_layer.canvas.select_all(false);
        }

        let size = self.chr_layer.canvas_size();
        let mut counts: BTreeMap<(Vec<u32>, u32), u32> = BTreeMap::new();
        for y in (0..size.height).step_by(edge as usize) {
            for x in (0..size.width).step_by(edge as usize) {
                *counts.entry(self.metatile_at(x, y, edge)).or_insert(0) += 1;
            }
        }

        if let Some(threshold) = select_threshold {
            for y in (0..size.height).step_by(edge as usize) {
                for x in (0..size.width).step_by(edge as usize) {
                    if counts[&self.metatile_at(x, y, edge)] <= threshold {
                        for yy in 0..edge {
                            for xx in 0..edge {
                                self.chr_layer.canvas.select(Position::new(x + xx, y + yy), true);
                            }
                        }
                    }
                }
            }
        }

        counts.len()
    }

    fn metatile_at(&self, x: i32, y: i32, edge: i32) -> (Vec<u32>, u32) {
        let size = self.chr_layer.canvas_size();
        let mut tiles = Vec::with_capacity((edge * edge) as usize);
        for yy in 0..edge {
            for xx in 0..edge {
                if x + xx < size.width && y + yy < size.height {
                    tiles.push(self.chr_layer.get((x + xx, y + yy)));
                } else {
                    tiles.push(0);
                }
            }
        }
        let collision = self.collision_layer.tiles.try_get(Position::new(x / edge, y / edge)).unwrap_or(0);
        (tiles, collision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rectangle;

    #[test]
    fn test_count_metatiles_distinct_pairs() {
        let mut level = Level::new("test");
        level.resize(Size::new(4, 4), Size::new(2, 2));
        // top-left 2x2 block differs, the rest are all-zero blocks
        level.chr_layer.set((0, 0), 7);
        assert_eq!(level.count_metatiles(2, None), 2);

        // same tiles but a differing collision cell splits a pair
        level.collision_layer.set((1, 1), 3);
        assert_eq!(level.count_metatiles(2, None), 3);
    }

    #[test]
    fn test_count_metatiles_pads_past_edges() {
        let mut level = Level::new("test");
        level.resize(Size::new(3, 3), Size::new(2, 2));
        level.chr_layer.tiles.fill(5);
        // zero padding past the right and bottom edges splits the blocks
        assert_eq!(level.count_metatiles(2, None), 4);
    }

    #[test]
    fn test_count_metatiles_selects_rare_blocks() {
        let mut level = Level::new("test");
        level.resize(Size::new(4, 2), Size::new(2, 1));
        level.chr_layer.set((2, 0), 9);
        level.chr_layer.canvas.select((0, 0), true);

        let distinct = level.count_metatiles(2, Some(1));
        assert_eq!(distinct, 2);
        // both blocks occur once; prior selection was cleared first
        assert_eq!(level.chr_layer.canvas.get_rectangle(), Rectangle::from(0, 0, 4, 2));
    }

    #[test]
    fn test_zero_metatile_size_counts_nothing() {
        let mut level = Level::new("test");
        assert_eq!(level.count_metatiles(0, None), 0);
    }
}
