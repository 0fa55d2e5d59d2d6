use crate::{Grid, Position, Rectangle, Size};

/// A boolean grid of selected cells plus a cached bounding rectangle.
///
/// The cached rectangle is empty iff nothing is selected; otherwise it is the
/// tightest rectangle containing every selected cell, and it is never stale
/// after a mutating call returns. Growing the selection updates the cache in
/// O(1) per cell; deselecting rescans the old bounds, since the removed cell
/// may not have been the extremal one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionMap {
    cells: Grid<bool>,
    rect: Rectangle,
}

impl SelectionMap {
    pub fn new(size: impl Into<Size>) -> Self {
        SelectionMap {
            cells: Grid::new(size),
            rect: Rectangle::default(),
        }
    }

    pub fn get_size(&self) -> Size {
        self.cells.get_size()
    }

    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }

    /// The cached bounding rectangle of the selection.
    pub fn get_rectangle(&self) -> Rectangle {
        self.rect
    }

    pub fn get_is_selected(&self, pos: impl Into<Position>) -> bool {
        self.cells.try_get(pos).unwrap_or(false)
    }

    pub fn select_all(&mut self, select: bool) {
        self.cells.fill(select);
        self.rect = if select {
            Rectangle::from_min_size((0, 0), self.get_size())
        } else {
            Rectangle::default()
        };
    }

    pub fn invert(&mut self) {
        let mut min = Position::new(i32::MAX, i32::MAX);
        let mut max = Position::new(i32::MIN, i32::MIN);
        let bounds = Rectangle::from_min_size((0, 0), self.cells.get_size());
        for pos in bounds.positions() {
            let selected = !self.cells.get(pos);
            self.cells.set(pos, selected);
            if selected {
                min = min.min(pos);
                max = max.max(pos);
            }
        }
        self.rect = if min.x > max.x || min.y > max.y {
            Rectangle::default()
        } else {
            Rectangle::enclosing(min, max)
        };
    }

    /// Out-of-bounds positions are ignored.
    pub fn select(&mut self, pos: impl Into<Position>, select: bool) {
        let pos = pos.into();
        if !self.cells.in_bounds(pos) {
            return;
        }
        self.cells.set(pos, select);
        if select {
            self.rect = self.rect.grow_to_contain(pos);
        } else {
            self.recalc(self.rect);
        }
    }

    /// Selects or deselects every cell of `rect` (clipped to the map).
    pub fn select_rect(&mut self, rect: Rectangle, select: bool) {
        let rect = rect.cropped_to(self.cells.get_size());
        if rect.is_empty() {
            return;
        }
        for pos in rect.positions() {
            self.cells.set(pos, select);
        }
        if select {
            self.rect = self.rect.union(&rect);
        } else {
            self.recalc(self.rect);
        }
    }

    /// Cells outside the new bounds are dropped; the cached rectangle is
    /// recomputed over the new bounds.
    pub fn resize(&mut self, size: impl Into<Size>) {
        self.cells.resize(size);
        self.recalc(Rectangle::from_min_size((0, 0), self.cells.get_size()));
    }

    /// Selected positions in raster order over the cached rectangle.
    pub fn selected_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.rect.positions().filter(|pos| self.cells.get(*pos))
    }

    fn recalc(&mut self, within: Rectangle) {
        let mut min = Position::new(i32::MAX, i32::MAX);
        let mut max = Position::new(i32::MIN, i32::MIN);
        for pos in within.positions() {
            if self.cells.get(pos) {
                min = min.min(pos);
                max = max.max(pos);
            }
        }
        self.rect = if min.x > max.x || min.y > max.y {
            Rectangle::default()
        } else {
            Rectangle::enclosing(min, max)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recomputed_rect(map: &SelectionMap) -> Rectangle {
        let mut min = Position::new(i32::MAX, i32::MAX);
        let mut max = Position::new(i32::MIN, i32::MIN);
        let bounds = Rectangle::from_min_size((0, 0), map.get_size());
        for pos in bounds.positions() {
            if map.get_is_selected(pos) {
                min = min.min(pos);
                max = max.max(pos);
            }
        }
        if min.x > max.x || min.y > max.y {
            Rectangle::default()
        } else {
            Rectangle::enclosing(min, max)
        }
    }

    #[test]
    fn test_cache_never_stale() {
        let mut map = SelectionMap::new((8, 8));
        map.select((2, 2), true);
        assert_eq!(map.get_rectangle(), recomputed_rect(&map));
        map.select((6, 1), true);
        assert_eq!(map.get_rectangle(), recomputed_rect(&map));
        map.select_rect(Rectangle::from(0, 4, 3, 3), true);
        assert_eq!(map.get_rectangle(), recomputed_rect(&map));
        map.select((6, 1), false);
        assert_eq!(map.get_rectangle(), recomputed_rect(&map));
        map.select_rect(Rectangle::from(0, 0, 8, 8), false);
        assert_eq!(map.get_rectangle(), recomputed_rect(&map));
        assert!(map.is_empty());
    }

    #[test]
    fn test_out_of_bounds_select_is_ignored() {
        let mut map = SelectionMap::new((4, 4));
        map.select((-1, 0), true);
        map.select((4, 4), true);
        assert!(map.is_empty());
    }

    #[test]
    fn test_invert_twice_restores() {
        let mut map = SelectionMap::new((5, 5));
        map.select((1, 3), true);
        map.select((4, 0), true);
        let before = map.clone();
        map.invert();
        assert_eq!(map.get_rectangle(), recomputed_rect(&map));
        map.invert();
        assert_eq!(map, before);
    }

    #[test]
    fn test_select_all() {
        let mut map = SelectionMap::new((3, 2));
        map.select_all(true);
        assert_eq!(map.get_rectangle(), Rectangle::from(0, 0, 3, 2));
        map.select_all(false);
        assert!(map.is_empty());
    }

    #[test]
    fn test_resize_drops_outside_cells() {
        let mut map = SelectionMap::new((6, 6));
        map.select((1, 1), true);
        map.select((5, 5), true);
        map.resize((4, 4));
        assert_eq!(map.get_rectangle(), Rectangle::from(1, 1, 1, 1));
        map.resize((6, 6));
        assert!(!map.get_is_selected((5, 5)));
    }
}
