use crate::{Grid, Object, Position, Project, Rectangle, Size, TileBuffer, TileKind, TileLayer, TilesSnapshot};

/// Addresses one of the project's tile layers by value; commands never hold
/// references into the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerTarget {
    /// The palette model's color layer.
    Colors,
    /// A level's graphics layer.
    Chr(usize),
    /// A level's collision layer.
    Collision(usize),
}

/// A document mutation. Applying a command performs it and yields the
/// command that exactly undoes it; commands are named for what applying
/// them does.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EditCommand {
    #[default]
    Nop,
    /// Write `tiles` over `rect` of the target layer.
    SetTiles {
        target: LayerTarget,
        rect: Rectangle,
        tiles: Vec<u32>,
    },
    /// Install a palette-row count.
    SetPaletteCount { count: u32 },
    /// Install a whole graphics grid (full-grid swap, not windowed).
    SetCanvas { level: usize, tiles: Grid<u32> },
    /// Remove objects by index, highest first.
    RemoveObjects { level: usize, indices: Vec<usize> },
    /// Re-insert (index, object) pairs, lowest first.
    InsertObjects { level: usize, objects: Vec<(usize, Object)> },
    /// Swap out the object at one index.
    ReplaceObject { level: usize, index: usize, object: Object },
    /// Install recorded positions for the indexed objects.
    MoveObjects {
        level: usize,
        indices: Vec<usize>,
        positions: Vec<Position>,
    },
}

impl EditCommand {
    pub fn is_nop(&self) -> bool {
        matches!(self, EditCommand::Nop)
    }

    /// Wraps a layer snapshot as a tile command; empty snapshots collapse to
    /// [`EditCommand::Nop`].
    pub fn from_snapshot(target: LayerTarget, snapshot: Option<TilesSnapshot>) -> EditCommand {
        match snapshot {
            Some(snapshot) if !snapshot.rect.is_empty() => EditCommand::SetTiles {
                target,
                rect: snapshot.rect,
                tiles: snapshot.tiles,
            },
            _ => EditCommand::Nop,
        }
    }
}

fn write_tiles<K: TileKind>(layer: &mut TileLayer<K>, rect: Rectangle, tiles: &[u32]) -> TilesSnapshot {
    let previous = layer.snapshot(rect);
    for (pos, &value) in rect.positions().zip(tiles) {
        layer.set(pos, value);
    }
    previous
}

impl Project {
    /// Applies a command and returns its inverse. Marks the project dirty.
    pub fn apply(&mut self, command: EditCommand) -> EditCommand {
        self.mark_modified();
        match command {
            EditCommand::Nop => EditCommand::Nop,

            EditCommand::SetTiles { target, rect, tiles } => {
                let previous = match target {
                    LayerTarget::Colors => write_tiles(&mut self.palette.colors, rect, &tiles),
                    LayerTarget::Chr(level) => write_tiles(&mut self.levels[level].chr_layer, rect, &tiles),
                    LayerTarget::Collision(level) => write_tiles(&mut self.levels[level].collision_layer, rect, &tiles),
                };
                EditCommand::SetTiles {
                    target,
                    rect: previous.rect,
                    tiles: previous.tiles,
                }
            }

            EditCommand::SetPaletteCount { count } => {
                let previous = self.palette.count();
                self.palette.set_count(count);
                EditCommand::SetPaletteCount { count: previous }
            }

            EditCommand::SetCanvas { level, tiles } => {
                let layer = &mut self.levels[level].chr_layer;
                let previous = std::mem::replace(&mut layer.tiles, tiles);
                let size = layer.tiles.get_size();
                layer.canvas.resize(size);
                EditCommand::SetCanvas { level, tiles: previous }
            }

            EditCommand::RemoveObjects { level, indices } => {
                // indices are descending so each removal leaves the rest valid
                let objects = &mut self.levels[level].objects;
                let mut removed = Vec::with_capacity(indices.len());
                for &index in indices.iter().rev() {
                    removed.push((index, objects[index].clone()));
                }
                for &index in &indices {
                    objects.remove(index);
                }
                EditCommand::InsertObjects { level, objects: removed }
            }

            EditCommand::InsertObjects { level, objects } => {
                // pairs are ascending so each insert lands at its final index
                let indices = objects.iter().rev().map(|(index, _)| *index).collect();
                let list = &mut self.levels[level].objects;
                for (index, object) in objects {
                    list.insert(index, object);
                }
                EditCommand::RemoveObjects { level, indices }
            }

            EditCommand::ReplaceObject { level, index, object } => {
                let slot = &mut self.levels[level].objects[index];
                let previous = std::mem::replace(slot, object);
                EditCommand::ReplaceObject {
                    level,
                    index,
                    object: previous,
                }
            }

            EditCommand::MoveObjects { level, indices, positions } => {
                debug_assert_eq!(indices.len(), positions.len());
                let objects = &mut self.levels[level].objects;
                let previous = indices.iter().map(|&index| objects[index].position).collect();
                for (&index, &position) in indices.iter().zip(&positions) {
                    objects[index].position = position;
                }
                EditCommand::MoveObjects {
                    level,
                    indices,
                    positions: previous,
                }
            }
        }
    }

    /// Pops the most recent undo entry, applies it, and records the inverse
    /// on the redo stack.
    pub fn undo(&mut self) {
        if let Some(command) = self.history.pop_undo() {
            let inverse = self.apply(command);
            self.history.record_redo(inverse);
        }
    }

    pub fn redo(&mut self) {
        if let Some(command) = self.history.pop_redo() {
            let inverse = self.apply(command);
            self.history.record_undo(inverse);
        }
    }

    // === user-level edits, returning the record to push onto the history ===

    /// Tiles the picker selection over the canvas selection of `target`.
    pub fn fill_layer(&mut self, target: LayerTarget) -> EditCommand {
        let snapshot = match target {
            LayerTarget::Colors => self.palette.colors.fill(),
            LayerTarget::Chr(level) => self.levels[level].chr_layer.fill(),
            LayerTarget::Collision(level) => self.levels[level].collision_layer.fill(),
        };
        self.finish_edit(EditCommand::from_snapshot(target, snapshot))
    }

    /// Captures the canvas selection of `target` into a detached buffer,
    /// resetting the captured cells.
    pub fn cut_layer(&mut self, target: LayerTarget) -> (TileBuffer, EditCommand) {
        let (buffer, snapshot) = match target {
            LayerTarget::Colors => self.palette.colors.cut(),
            LayerTarget::Chr(level) => self.levels[level].chr_layer.cut(),
            LayerTarget::Collision(level) => self.levels[level].collision_layer.cut(),
        };
        let command = self.finish_edit(EditCommand::from_snapshot(target, Some(snapshot)));
        (buffer, command)
    }

    /// Transparent-pastes a buffer at `at`.
    pub fn paste_layer(&mut self, target: LayerTarget, buffer: &TileBuffer, at: Position) -> EditCommand {
        fn run<K: TileKind>(layer: &mut TileLayer<K>, buffer: &TileBuffer, at: Position) -> Option<TilesSnapshot> {
            let snapshot = layer.snapshot(Rectangle::from_min_size(at, buffer.tiles.get_size()));
            layer.paste(buffer, at);
            Some(snapshot)
        }
        let snapshot = match target {
            LayerTarget::Colors => run(&mut self.palette.colors, buffer, at),
            LayerTarget::Chr(level) => run(&mut self.levels[level].chr_layer, buffer, at),
            LayerTarget::Collision(level) => run(&mut self.levels[level].collision_layer, buffer, at),
        };
        self.finish_edit(EditCommand::from_snapshot(target, snapshot))
    }

    /// Tiles a detached buffer over the canvas selection of `target`.
    pub fn fill_paste_layer(&mut self, target: LayerTarget, buffer: &TileBuffer) -> EditCommand {
        let snapshot = match target {
            LayerTarget::Colors => self.palette.colors.fill_paste(buffer),
            LayerTarget::Chr(level) => self.levels[level].chr_layer.fill_paste(buffer),
            LayerTarget::Collision(level) => self.levels[level].collision_layer.fill_paste(buffer),
        };
        self.finish_edit(EditCommand::from_snapshot(target, snapshot))
    }

    /// Stamps the picker selection of `target` at a pen position.
    pub fn stamp_layer(&mut self, target: LayerTarget, pen: Position) -> EditCommand {
        fn run<K: TileKind>(layer: &mut TileLayer<K>, pen: Position) -> Option<TilesSnapshot> {
            if layer.picker.is_empty() {
                return None;
            }
            let snapshot = layer.snapshot_around(pen);
            let mut writes = Vec::new();
            layer.for_each_picked(pen, |at, tile| writes.push((at, tile)));
            for (at, tile) in writes {
                layer.set(at, tile);
            }
            Some(snapshot)
        }
        let snapshot = match target {
            LayerTarget::Colors => run(&mut self.palette.colors, pen),
            LayerTarget::Chr(level) => run(&mut self.levels[level].chr_layer, pen),
            LayerTarget::Collision(level) => run(&mut self.levels[level].collision_layer, pen),
        };
        self.finish_edit(EditCommand::from_snapshot(target, snapshot))
    }

    /// Overwrites the attribute bits of a level's graphics selection.
    pub fn fill_attribute(&mut self, level: usize) -> EditCommand {
        let snapshot = self.levels[level].chr_layer.fill_attribute();
        self.finish_edit(EditCommand::from_snapshot(LayerTarget::Chr(level), snapshot))
    }

    /// Appends objects to a level.
    pub fn add_objects(&mut self, level: usize, objects: Vec<Object>) -> EditCommand {
        if objects.is_empty() {
            return EditCommand::Nop;
        }
        let base = self.levels[level].objects.len();
        let objects = objects.into_iter().enumerate().map(|(offset, object)| (base + offset, object)).collect();
        self.apply(EditCommand::InsertObjects { level, objects })
    }

    /// Deletes objects by index (any order, duplicates ignored).
    pub fn delete_objects(&mut self, level: usize, mut indices: Vec<usize>) -> EditCommand {
        indices.sort_unstable();
        indices.dedup();
        indices.reverse();
        if indices.is_empty() {
            return EditCommand::Nop;
        }
        self.apply(EditCommand::RemoveObjects { level, indices })
    }

    /// Replaces the object at `index` wholesale (field edits included).
    pub fn replace_object(&mut self, level: usize, index: usize, object: Object) -> EditCommand {
        self.apply(EditCommand::ReplaceObject { level, index, object })
    }

    /// Moves the indexed objects to new positions.
    pub fn move_objects(&mut self, level: usize, indices: Vec<usize>, positions: Vec<Position>) -> EditCommand {
        if indices.is_empty() {
            return EditCommand::Nop;
        }
        self.apply(EditCommand::MoveObjects { level, indices, positions })
    }

    pub fn set_palette_count(&mut self, count: u32) -> EditCommand {
        self.apply(EditCommand::SetPaletteCount { count })
    }

    /// Resizes a level's canvases; the record restores the prior graphics
    /// grid on undo.
    pub fn resize_level(&mut self, level: usize, size: Size) -> EditCommand {
        let collision_size = self.collision_div(size);
        let target = &mut self.levels[level];
        let record = EditCommand::SetCanvas {
            level,
            tiles: target.chr_layer.tiles.clone(),
        };
        target.resize(size, collision_size);
        self.mark_modified();
        record
    }

    fn finish_edit(&mut self, command: EditCommand) -> EditCommand {
        if !command.is_nop() {
            self.mark_modified();
        }
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with_objects(count: usize) -> Project {
        let mut project = Project::default();
        for i in 0..count {
            let mut object = Object::new("object", Position::new(i as i32, 0));
            object.name = format!("obj{i}");
            project.levels[0].objects.push(object);
        }
        project
    }

    #[test]
    fn test_set_tiles_roundtrip() {
        let mut project = Project::default();
        let before = project.levels[0].chr_layer.tiles.clone();
        let rect = Rectangle::from(1, 1, 2, 2);
        let command = EditCommand::SetTiles {
            target: LayerTarget::Chr(0),
            rect,
            tiles: vec![10, 11, 12, 13],
        };

        let inverse = project.apply(command);
        assert_eq!(project.levels[0].chr_layer.get((2, 2)), 13);
        assert!(project.modified);

        let again = project.apply(inverse);
        assert_eq!(project.levels[0].chr_layer.tiles, before);
        assert_eq!(
            again,
            EditCommand::SetTiles {
                target: LayerTarget::Chr(0),
                rect,
                tiles: vec![10, 11, 12, 13],
            }
        );
    }

    #[test]
    fn test_palette_count_swap() {
        let mut project = Project::default();
        let inverse = project.apply(EditCommand::SetPaletteCount { count: 5 });
        assert_eq!(project.palette.count(), 5);
        assert_eq!(inverse, EditCommand::SetPaletteCount { count: 1 });
    }

    #[test]
    fn test_remove_insert_objects_are_symmetric() {
        let mut project = project_with_objects(4);
        let before = project.levels[0].objects.clone();

        let inverse = project.apply(EditCommand::RemoveObjects {
            level: 0,
            indices: vec![3, 1],
        });
        assert_eq!(project.levels[0].objects.len(), 2);
        assert_eq!(project.levels[0].objects[0].name, "obj0");
        assert_eq!(project.levels[0].objects[1].name, "obj2");

        match &inverse {
            EditCommand::InsertObjects { objects, .. } => {
                assert_eq!(objects[0].0, 1);
                assert_eq!(objects[1].0, 3);
            }
            other => panic!("unexpected inverse {other:?}"),
        }

        let restore = project.apply(inverse);
        assert_eq!(project.levels[0].objects, before);
        assert_eq!(
            restore,
            EditCommand::RemoveObjects {
                level: 0,
                indices: vec![3, 1],
            }
        );
    }

    #[test]
    fn test_move_objects_swaps_positions() {
        let mut project = project_with_objects(2);
        let inverse = project.apply(EditCommand::MoveObjects {
            level: 0,
            indices: vec![0, 1],
            positions: vec![Position::new(8, 8), Position::new(9, 9)],
        });
        assert_eq!(project.levels[0].objects[0].position, Position::new(8, 8));

        project.apply(inverse);
        assert_eq!(project.levels[0].objects[0].position, Position::new(0, 0));
        assert_eq!(project.levels[0].objects[1].position, Position::new(1, 0));
    }

    #[test]
    fn test_canvas_swap_resizes_selection() {
        let mut project = Project::default();
        let record = project.resize_level(0, Size::new(4, 4));
        assert_eq!(project.levels[0].get_size(), Size::new(4, 4));
        assert_eq!(project.levels[0].chr_layer.canvas.get_size(), Size::new(4, 4));

        project.history.push(record);
        project.undo();
        assert_eq!(project.levels[0].get_size(), Size::new(24, 24));
        assert_eq!(project.levels[0].chr_layer.canvas.get_size(), Size::new(24, 24));
        project.redo();
        assert_eq!(project.levels[0].get_size(), Size::new(4, 4));
    }

    #[test]
    fn test_undo_redo_through_history() {
        let mut project = Project::default();
        let record = project.set_palette_count(7);
        project.history.push(record);
        assert_eq!(project.palette.count(), 7);

        project.undo();
        assert_eq!(project.palette.count(), 1);
        assert!(project.history.can_redo());

        project.redo();
        assert_eq!(project.palette.count(), 7);
    }

    #[test]
    fn test_fill_layer_empty_selection_is_soft_noop() {
        let mut project = Project::default();
        project.modified = false;
        let command = project.fill_layer(LayerTarget::Chr(0));
        assert!(command.is_nop());
        assert!(!project.modified);
    }

    #[test]
    fn test_stamp_layer_writes_picked_tiles() {
        let mut project = Project::default();
        project.levels[0].chr_layer.picker.select_rect(Rectangle::from(0, 0, 2, 1), true);
        let command = project.stamp_layer(LayerTarget::Chr(0), Position::new(3, 3));
        assert!(!command.is_nop());
        assert_eq!(project.levels[0].chr_layer.get((4, 3)), 1);

        project.history.push(command);
        project.undo();
        assert_eq!(project.levels[0].chr_layer.get((4, 3)), 0);
    }
}
