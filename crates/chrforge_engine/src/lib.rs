#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::too_many_lines,
    clippy::cast_lossless,
    clippy::cast_precision_loss,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::module_name_repetitions
)]

use std::ops::{Add, AddAssign, Sub, SubAssign};

mod position;
pub use position::*;

mod grid;
pub use grid::*;

mod selection_map;
pub use selection_map::*;

mod layer;
pub use layer::*;

mod palette;
pub use palette::*;

mod object;
pub use object::*;

pub mod chr;
pub use chr::{ChrPatterns, RgbTile, TileBitmaps};

pub mod collision;
pub use collision::CollisionTile;

mod loader;
pub use loader::*;

mod level;
pub use level::*;

mod project;
pub use project::*;

mod error;
pub use error::*;

pub mod editor;
pub use editor::{EditCommand, LayerTarget, UndoStack};

pub mod formats;

#[derive(Copy, Clone, Debug, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(width: {}, height: {})", self.width, self.height)
    }
}

impl PartialEq for Size {
    fn eq(&self, other: &Size) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl Eq for Size {}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Size { width, height }
    }

    /// Number of cells a grid of this size holds.
    pub fn area(self) -> usize {
        if self.width <= 0 || self.height <= 0 {
            return 0;
        }
        self.width as usize * self.height as usize
    }
}

impl From<(i32, i32)> for Size {
    fn from(value: (i32, i32)) -> Self {
        Size {
            width: value.0,
            height: value.1,
        }
    }
}

impl From<(usize, usize)> for Size {
    fn from(value: (usize, usize)) -> Self {
        Size {
            width: value.0 as i32,
            height: value.1 as i32,
        }
    }
}

impl From<(u16, u16)> for Size {
    fn from(value: (u16, u16)) -> Self {
        Size {
            width: value.0 as i32,
            height: value.1 as i32,
        }
    }
}

impl From<Position> for Size {
    fn from(value: Position) -> Self {
        Size {
            width: value.x,
            height: value.y,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rectangle {
    pub start: Position,
    pub size: Size,
}

impl std::fmt::Display for Rectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(x:{}, y:{}, width: {}, height: {})",
            self.start.x, self.start.y, self.size.width, self.size.height
        )
    }
}

impl Rectangle {
    pub fn new(start: Position, size: Size) -> Self {
        Self { start, size }
    }

    pub fn from(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            start: Position::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_min_size(pos: impl Into<Position>, size: impl Into<Size>) -> Rectangle {
        Rectangle {
            start: pos.into(),
            size: size.into(),
        }
    }

    /// The smallest rectangle containing both corner cells (inclusive).
    pub fn enclosing(p1: Position, p2: Position) -> Rectangle {
        let start = p1.min(p2);
        let end = p1.max(p2);
        Rectangle {
            start,
            size: Size::new(end.x - start.x + 1, end.y - start.y + 1),
        }
    }

    pub fn top_left(&self) -> Position {
        self.start
    }

    pub fn bottom_right(&self) -> Position {
        Position {
            x: self.start.x + self.size.width,
            y: self.start.y + self.size.height,
        }
    }

    pub fn get_width(&self) -> i32 {
        self.size.width
    }

    pub fn get_height(&self) -> i32 {
        self.size.height
    }

    pub fn get_size(&self) -> Size {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size.width <= 0 || self.size.height <= 0
    }

    pub fn is_inside(&self, pos: impl Into<Position>) -> bool {
        let pos = pos.into();
        self.start.x <= pos.x && self.start.y <= pos.y && pos.x < self.start.x + self.size.width && pos.y < self.start.y + self.size.height
    }

    /// Intersection of two rectangles; any degenerate result collapses to the
    /// canonical empty rectangle.
    pub fn intersect(&self, other: &Rectangle) -> Rectangle {
        let start = self.start.max(other.start);
        let end = self.bottom_right().min(other.bottom_right());
        if end.x <= start.x || end.y <= start.y {
            return Rectangle::default();
        }
        Rectangle {
            start,
            size: (end - start).into(),
        }
    }

    pub fn union(&self, other: &Rectangle) -> Rectangle {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let start = self.start.min(other.start);
        let end = self.bottom_right().max(other.bottom_right());
        Rectangle {
            start,
            size: (end - start).into(),
        }
    }

    /// Grows the rectangle by the minimal amount needed to contain `pos`.
    pub fn grow_to_contain(&self, pos: Position) -> Rectangle {
        self.union(&Rectangle::from_min_size(pos, (1, 1)))
    }

    /// Clips to the grid `(0,0)..size`.
    pub fn cropped_to(&self, bounds: Size) -> Rectangle {
        self.intersect(&Rectangle::from_min_size((0, 0), bounds))
    }

    pub fn x_range(&self) -> std::ops::Range<i32> {
        self.start.x..self.bottom_right().x
    }

    pub fn y_range(&self) -> std::ops::Range<i32> {
        self.start.y..self.bottom_right().y
    }

    /// All cell positions in raster order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let start = self.start;
        let width = self.size.width.max(0);
        let height = self.size.height.max(0);
        (start.y..start.y + height).flat_map(move |y| (start.x..start.x + width).map(move |x| Position::new(x, y)))
    }

    pub fn left(&self) -> i32 {
        self.start.x
    }

    pub fn right(&self) -> i32 {
        self.bottom_right().x
    }

    pub fn top(&self) -> i32 {
        self.start.y
    }

    pub fn bottom(&self) -> i32 {
        self.bottom_right().y
    }
}

impl Add<Position> for Rectangle {
    type Output = Rectangle;

    fn add(self, rhs: Position) -> Rectangle {
        Rectangle {
            start: self.start + rhs,
            size: self.size,
        }
    }
}

impl AddAssign<Position> for Rectangle {
    fn add_assign(&mut self, rhs: Position) {
        self.start += rhs;
    }
}

impl Sub<Position> for Rectangle {
    type Output = Rectangle;

    fn sub(self, rhs: Position) -> Rectangle {
        Rectangle {
            start: self.start - rhs,
            size: self.size,
        }
    }
}

impl SubAssign<Position> for Rectangle {
    fn sub_assign(&mut self, rhs: Position) {
        self.start -= rhs;
    }
}
