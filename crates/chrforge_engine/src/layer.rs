use crate::{Grid, Position, Rectangle, SelectionMap, Size};

/// Sentinel for "no tile here" in detached buffers; transparent on paste.
pub const NO_TILE: u32 = u32::MAX;

/// Mask to extract the tile index of a graphics tile value.
pub const TILE_INDEX_MASK: u32 = 0x3FFF;
/// Bit position of the 2-bit palette attribute.
pub const ATTRIBUTE_SHIFT: u32 = 14;
/// Mask of the 2-bit palette attribute.
pub const ATTRIBUTE_MASK: u32 = 0b11 << ATTRIBUTE_SHIFT;
/// Bit position of the CHR bank id.
pub const BANK_SHIFT: u32 = 16;

/// Extract the 14-bit tile index from a graphics tile value.
#[inline]
pub fn tile_index(tile: u32) -> u32 {
    tile & TILE_INDEX_MASK
}

/// Extract the 2-bit palette attribute from a graphics tile value.
#[inline]
pub fn tile_attribute(tile: u32) -> u32 {
    (tile >> ATTRIBUTE_SHIFT) & 0b11
}

/// Extract the CHR bank id from a graphics tile value.
#[inline]
pub fn tile_bank(tile: u32) -> u16 {
    (tile >> BANK_SHIFT) as u16
}

/// Replace the CHR bank id of a graphics tile value.
#[inline]
pub fn with_bank(tile: u32, bank: u16) -> u32 {
    (tile & 0xFFFF) | (u32::from(bank) << BANK_SHIFT)
}

/// Kind-specific encoding behavior of a [`TileLayer`], selected at
/// construction. The defaults implement the plain row-major picker layout.
pub trait TileKind {
    /// The value `reset` writes; also what a cut leaves behind.
    fn empty_value(&self) -> u32 {
        0
    }

    /// The editable extent; may be smaller than the backing grid.
    fn clip_size(&self, grid: Size) -> Size {
        grid
    }

    /// Encode a picker cell as a tile value.
    fn to_tile(&self, picker: Size, pick: Position) -> u32 {
        (pick.x + pick.y * picker.width) as u32
    }

    /// Decode a tile value back to its picker cell.
    fn to_pick(&self, picker: Size, tile: u32) -> Position {
        Position::new(tile as i32 % picker.width, tile as i32 / picker.width)
    }

    /// Called by the dropper with the sampled tile value, letting the kind
    /// adopt encoding state carried in the value (e.g. the bank id).
    fn sample(&mut self, _tile: u32) {}
}

/// Palette color cells: a raw 6-bit color code per cell, column-major picker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorTiles {
    /// Number of palette rows currently editable.
    pub visible_rows: u32,
}

/// The "no color" code (black backdrop).
pub const EMPTY_COLOR: u32 = 0x0F;

impl Default for ColorTiles {
    fn default() -> Self {
        ColorTiles { visible_rows: 1 }
    }
}

impl TileKind for ColorTiles {
    fn empty_value(&self) -> u32 {
        EMPTY_COLOR
    }

    fn clip_size(&self, grid: Size) -> Size {
        Size::new(grid.width, (self.visible_rows as i32).min(grid.height))
    }

    fn to_tile(&self, picker: Size, pick: Position) -> u32 {
        (pick.y + pick.x * picker.height) as u32
    }

    fn to_pick(&self, picker: Size, tile: u32) -> Position {
        Position::new(tile as i32 / picker.height, tile as i32 % picker.height)
    }
}

/// Graphics cells: 14-bit tile index, 2-bit attribute, bank id in the high
/// bits. The active attribute and bank are owned here and folded into every
/// encoded value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChrTiles {
    pub attribute: u8,
    pub bank: u16,
}

impl TileKind for ChrTiles {
    fn to_tile(&self, picker: Size, pick: Position) -> u32 {
        (pick.x + pick.y * picker.width) as u32 | (u32::from(self.attribute & 0b11) << ATTRIBUTE_SHIFT) | (u32::from(self.bank) << BANK_SHIFT)
    }

    fn to_pick(&self, picker: Size, tile: u32) -> Position {
        let tile = tile & TILE_INDEX_MASK;
        Position::new(tile as i32 % picker.width, tile as i32 / picker.width)
    }

    fn sample(&mut self, tile: u32) {
        self.bank = tile_bank(tile);
    }
}

/// Collision cells: an opaque small integer, the picker ordinal itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionTiles;

impl TileKind for CollisionTiles {}

/// A detached rectangle of tile values captured from a canvas. Cells holding
/// [`NO_TILE`] are transparent when pasted back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileBuffer {
    pub tiles: Grid<u32>,
}

/// A pre-mutation snapshot of a canvas region, the raw material of an undo
/// record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TilesSnapshot {
    pub rect: Rectangle,
    pub tiles: Vec<u32>,
}

/// An editable canvas of encoded tile values plus its two selections: the
/// picker (source palette/catalog) and the canvas (destination region).
#[derive(Clone, Debug, PartialEq)]
pub struct TileLayer<K: TileKind> {
    pub kind: K,
    pub tiles: Grid<u32>,
    pub picker: SelectionMap,
    pub canvas: SelectionMap,
}

impl<K: TileKind> TileLayer<K> {
    pub fn new(kind: K, picker_size: impl Into<Size>, canvas_size: impl Into<Size>) -> Self {
        let canvas_size = canvas_size.into();
        let mut tiles = Grid::new(canvas_size);
        let empty = kind.empty_value();
        if empty != 0 {
            tiles.fill(empty);
        }
        TileLayer {
            kind,
            tiles,
            picker: SelectionMap::new(picker_size),
            canvas: SelectionMap::new(canvas_size),
        }
    }

    /// The editable extent (may be smaller than the backing grid).
    pub fn canvas_size(&self) -> Size {
        self.kind.clip_size(self.tiles.get_size())
    }

    pub fn resize_canvas(&mut self, size: impl Into<Size>) {
        let size = size.into();
        self.canvas.resize(size);
        self.tiles.resize(size);
    }

    pub fn get(&self, pos: impl Into<Position>) -> u32 {
        self.tiles.get(pos)
    }

    pub fn set(&mut self, pos: impl Into<Position>, value: u32) {
        self.tiles.set(pos, value);
    }

    /// Writes the layer's empty encoding (not necessarily zero).
    pub fn reset(&mut self, pos: impl Into<Position>) {
        let empty = self.kind.empty_value();
        self.tiles.set(pos, empty);
    }

    pub fn to_tile(&self, pick: Position) -> u32 {
        self.kind.to_tile(self.picker.get_size(), pick)
    }

    pub fn to_pick(&self, tile: u32) -> Position {
        self.kind.to_pick(self.picker.get_size(), tile)
    }

    /// Snapshot of the canvas values in `rect` (clipped to the canvas).
    pub fn snapshot(&self, rect: Rectangle) -> TilesSnapshot {
        let rect = rect.cropped_to(self.canvas_size());
        let tiles = rect.positions().map(|pos| self.get(pos)).collect();
        TilesSnapshot { rect, tiles }
    }

    /// Snapshot of the region a picker stamp at `pen` can touch.
    pub fn snapshot_around(&self, pen: Position) -> TilesSnapshot {
        self.snapshot(Rectangle::from_min_size(pen, self.picker.get_size()))
    }

    /// Captures the selected cells within the canvas selection rectangle into
    /// a detached buffer; unselected cells become [`NO_TILE`].
    pub fn copy(&self) -> TileBuffer {
        let rect = self.canvas.get_rectangle().cropped_to(self.canvas_size());
        let mut tiles = Grid::new(rect.get_size());
        tiles.fill(NO_TILE);
        for pos in rect.positions() {
            if self.canvas.get_is_selected(pos) {
                tiles.set(pos - rect.start, self.get(pos));
            }
        }
        TileBuffer { tiles }
    }

    /// [`TileLayer::copy`], plus resetting the captured cells in place. The
    /// returned snapshot covers the pre-cut region.
    pub fn cut(&mut self) -> (TileBuffer, TilesSnapshot) {
        let rect = self.canvas.get_rectangle().cropped_to(self.canvas_size());
        let undo = self.snapshot(rect);
        let buffer = self.copy();
        for pos in rect.positions() {
            if self.canvas.get_is_selected(pos) {
                self.reset(pos);
            }
        }
        (buffer, undo)
    }

    /// Writes every non-sentinel buffer cell at `at` plus its local offset,
    /// skipping out-of-bounds destinations.
    pub fn paste(&mut self, buffer: &TileBuffer, at: Position) {
        let bounds = self.canvas_size();
        for pos in Rectangle::from_min_size((0, 0), buffer.tiles.get_size()).positions() {
            let value = buffer.tiles.get(pos);
            let dest = at + pos;
            if value != NO_TILE && dest.x >= 0 && dest.y >= 0 && dest.x < bounds.width && dest.y < bounds.height {
                self.set(dest, value);
            }
        }
    }

    /// Tiles the picker selection over the canvas selection with wraparound.
    /// Returns the pre-fill snapshot, or `None` if either selection is empty.
    pub fn fill(&mut self) -> Option<TilesSnapshot> {
        let canvas_rect = self.canvas.get_rectangle().cropped_to(self.canvas_size());
        let picker_rect = self.picker.get_rectangle();
        if canvas_rect.is_empty() || picker_rect.is_empty() {
            return None;
        }
        let undo = self.snapshot(canvas_rect);
        let picker_size = self.picker.get_size();
        for pos in self.canvas.selected_positions() {
            let offset = pos - canvas_rect.start;
            let pick = Position::new(offset.x % picker_rect.get_width(), offset.y % picker_rect.get_height()) + picker_rect.start;
            let tile = self.kind.to_tile(picker_size, pick);
            self.tiles.set(pos, tile);
        }
        Some(undo)
    }

    /// [`TileLayer::fill`] reading from a detached buffer instead of the
    /// picker; sentinel cells are skipped.
    pub fn fill_paste(&mut self, buffer: &TileBuffer) -> Option<TilesSnapshot> {
        let canvas_rect = self.canvas.get_rectangle().cropped_to(self.canvas_size());
        let buffer_size = buffer.tiles.get_size();
        if canvas_rect.is_empty() || buffer_size.area() == 0 {
            return None;
        }
        let undo = self.snapshot(canvas_rect);
        let bounds = self.canvas_size();
        for pos in self.canvas.selected_positions() {
            let offset = pos - canvas_rect.start;
            let value = buffer.tiles.get(Position::new(offset.x % buffer_size.width, offset.y % buffer_size.height));
            if value != NO_TILE && pos.x < bounds.width && pos.y < bounds.height {
                self.tiles.set(pos, value);
            }
        }
        Some(undo)
    }

    /// Reads the tile at `pos` and selects the picker cell it decodes to.
    pub fn dropper(&mut self, pos: Position) {
        let tile = self.get(pos);
        self.kind.sample(tile);
        self.picker.select_all(false);
        let pick = self.kind.to_pick(self.picker.get_size(), tile);
        self.picker.select(pick, true);
    }

    /// Enumerates (destination, encoded tile) pairs for the picker selection
    /// translated to a pen position, skipping out-of-bounds destinations.
    pub fn for_each_picked(&self, pen: Position, mut f: impl FnMut(Position, u32)) {
        let select_rect = self.picker.get_rectangle();
        let bounds = self.canvas_size();
        let picker_size = self.picker.get_size();
        for pick in self.picker.selected_positions() {
            let tile = self.kind.to_tile(picker_size, pick);
            let at = pen + pick - select_rect.start;
            if at.x >= 0 && at.y >= 0 && at.x < bounds.width && at.y < bounds.height {
                f(at, tile);
            }
        }
    }
}

impl TileLayer<ChrTiles> {
    /// Overwrites the attribute bits of every selected cell in place, leaving
    /// index and bank bits untouched. `None` when the selection is empty or
    /// no attribute is active.
    pub fn fill_attribute(&mut self) -> Option<TilesSnapshot> {
        let canvas_rect = self.canvas.get_rectangle().cropped_to(self.canvas_size());
        if canvas_rect.is_empty() || self.kind.attribute >= 4 {
            return None;
        }
        let undo = self.snapshot(canvas_rect);
        let attribute = u32::from(self.kind.attribute & 0b11) << ATTRIBUTE_SHIFT;
        for pos in self.canvas.selected_positions() {
            let tile = (self.tiles.get(pos) & !ATTRIBUTE_MASK) | attribute;
            self.tiles.set(pos, tile);
        }
        Some(undo)
    }
}
