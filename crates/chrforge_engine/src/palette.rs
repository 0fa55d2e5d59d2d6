use rgb::RGB8;

use crate::{ColorTiles, Position, Size, TileLayer};

/// Columns of the color canvas: eight sub-palette triples plus the shared
/// backdrop color.
pub const PALETTE_COLUMNS: i32 = 25;
/// Maximum number of palette rows a project can hold.
pub const PALETTE_MAX_ROWS: i32 = 256;
/// Canvas column holding the shared backdrop color.
pub const BACKDROP_COLUMN: i32 = 24;
/// Color picker layout: 64 master colors as 4 columns of 16.
pub const COLOR_PICKER_SIZE: Size = Size { width: 4, height: 16 };

/// Seed palette written into row 0 of a fresh project.
const EXAMPLE_PALETTE: [u32; 25] = [
    0x11, 0x2B, 0x39, //
    0x13, 0x21, 0x3B, //
    0x15, 0x23, 0x31, //
    0x17, 0x25, 0x33, //
    0x02, 0x14, 0x26, //
    0x04, 0x16, 0x28, //
    0x06, 0x18, 0x2A, //
    0x08, 0x1A, 0x2C, //
    0x0F,
];

const fn c(r: u8, g: u8, b: u8) -> RGB8 {
    RGB8 { r, g, b }
}

/// The fixed 64-entry master palette color codes resolve through.
pub static MASTER_PALETTE: [RGB8; 64] = [
    c(0x7C, 0x7C, 0x7C),
    c(0x00, 0x00, 0xFC),
    c(0x00, 0x00, 0xBC),
    c(0x44, 0x28, 0xBC),
    c(0x94, 0x00, 0x84),
    c(0xA8, 0x00, 0x20),
    c(0xA8, 0x10, 0x00),
    c(0x88, 0x14, 0x00),
    c(0x50, 0x30, 0x00),
    c(0x00, 0x78, 0x00),
    c(0x00, 0x68, 0x00),
    c(0x00, 0x58, 0x00),
    c(0x00, 0x40, 0x58),
    c(0x00, 0x00, 0x00),
    c(0x00, 0x00, 0x00),
    c(0x00, 0x00, 0x00),
    c(0xBC, 0xBC, 0xBC),
    c(0x00, 0x78, 0xF8),
    c(0x00, 0x58, 0xF8),
    c(0x68, 0x44, 0xFC),
    c(0xD8, 0x00, 0xCC),
    c(0xE4, 0x00, 0x58),
    c(0xF8, 0x38, 0x00),
    c(0xE4, 0x5C, 0x10),
    c(0xAC, 0x7C, 0x00),
    c(0x00, 0xB8, 0x00),
    c(0x00, 0xA8, 0x00),
    c(0x00, 0xA8, 0x44),
    c(0x00, 0x88, 0x88),
    c(0x00, 0x00, 0x00),
    c(0x00, 0x00, 0x00),
    c(0x00, 0x00, 0x00),
    c(0xF8, 0xF8, 0xF8),
    c(0x3C, 0xBC, 0xFC),
    c(0x68, 0x88, 0xFC),
    c(0x98, 0x78, 0xF8),
    c(0xF8, 0x78, 0xF8),
    c(0xF8, 0x58, 0x98),
    c(0xF8, 0x78, 0x58),
    c(0xFC, 0xA0, 0x44),
    c(0xF8, 0xB8, 0x00),
    c(0xB8, 0xF8, 0x18),
    c(0x58, 0xD8, 0x54),
    c(0x58, 0xF8, 0x98),
    c(0x00, 0xE8, 0xD8),
    c(0x78, 0x78, 0x78),
    c(0x00, 0x00, 0x00),
    c(0x00, 0x00, 0x00),
    c(0xFC, 0xFC, 0xFC),
    c(0xA4, 0xE4, 0xFC),
    c(0xB8, 0xB8, 0xF8),
    c(0xD8, 0xB8, 0xF8),
    c(0xF8, 0xB8, 0xF8),
    c(0xF8, 0xA4, 0xC0),
    c(0xF0, 0xD0, 0xB0),
    c(0xFC, 0xE0, 0xA8),
    c(0xF8, 0xD8, 0x78),
    c(0xD8, 0xF8, 0x78),
    c(0xB8, 0xF8, 0xB8),
    c(0xB8, 0xF8, 0xD8),
    c(0x00, 0xFC, 0xFC),
    c(0xF8, 0xD8, 0xF8),
    c(0x00, 0x00, 0x00),
    c(0x00, 0x00, 0x00),
];

/// The project's palette rows: a color [`TileLayer`] whose canvas holds one
/// palette set per row, of which the first `count()` rows are editable.
#[derive(Clone, Debug, PartialEq)]
pub struct PaletteModel {
    pub colors: TileLayer<ColorTiles>,
}

impl Default for PaletteModel {
    fn default() -> Self {
        let mut colors = TileLayer::new(
            ColorTiles { visible_rows: 1 },
            COLOR_PICKER_SIZE,
            Size::new(PALETTE_COLUMNS, PALETTE_MAX_ROWS),
        );
        for (x, value) in EXAMPLE_PALETTE.iter().enumerate() {
            colors.set((x, 0usize), *value);
        }
        PaletteModel { colors }
    }
}

impl PaletteModel {
    /// Number of palette rows in use.
    pub fn count(&self) -> u32 {
        self.colors.kind.visible_rows
    }

    pub fn set_count(&mut self, count: u32) {
        self.colors.kind.visible_rows = count;
    }

    /// Assembles the 16-entry render palette of row `index`: the shared
    /// backdrop replicated into slots 0/4/8/12, the four background
    /// sub-palette triples behind them.
    pub fn palette_array(&self, index: u8) -> [u8; 16] {
        let y = i32::from(index);
        let mut result = [0u8; 16];
        for sub in 0..4 {
            result[sub * 4] = self.colors.get(Position::new(BACKDROP_COLUMN, y)) as u8;
            for slot in 0..3 {
                result[sub * 4 + slot + 1] = self.colors.get(Position::new((sub * 3 + slot) as i32, y)) as u8;
            }
        }
        result
    }
}
