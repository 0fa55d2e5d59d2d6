use std::path::Path;

use chrforge_engine::{LayerTarget, Object, Position, Project, Rectangle};

fn document_bytes(project: &Project) -> Vec<u8> {
    project.write_file(Path::new("")).unwrap()
}

/// Drives a mixed editing session through the history, then unwinds and
/// replays it, comparing the serialized document byte for byte at each end.
#[test]
fn undo_all_then_redo_all_restores_documents_exactly() {
    let mut project = Project::default();
    project.object_classes[0].fields.push(chrforge_engine::ClassField {
        name: "flag".to_string(),
        type_tag: "U".to_string(),
    });
    project.levels[0].collision_layer.tiles.fill(3);
    let initial = document_bytes(&project);

    // 1: fill a graphics region
    {
        let layer = &mut project.levels[0].chr_layer;
        layer.picker.select_rect(Rectangle::from(0, 0, 2, 2), true);
        layer.canvas.select_rect(Rectangle::from(1, 1, 6, 4), true);
    }
    let record = project.fill_layer(LayerTarget::Chr(0));
    project.history.push(record);

    // 2: stamp at a pen position
    let record = project.stamp_layer(LayerTarget::Chr(0), Position::new(10, 10));
    project.history.push(record);

    // 3: rewrite attribute bits over the selection
    project.levels[0].chr_layer.kind.attribute = 1;
    let record = project.fill_attribute(0);
    project.history.push(record);

    // 4: add two objects
    let mut object = Object::new("object", Position::new(2, 2));
    object.fields.insert("flag".to_string(), "on".to_string());
    let record = project.add_objects(0, vec![object, Object::new("object", Position::new(5, 5))]);
    project.history.push(record);

    // 5: move one of them
    let record = project.move_objects(0, vec![1], vec![Position::new(8, 1)]);
    project.history.push(record);

    // 6: replace the first one's fields
    let mut replacement = Object::new("object", Position::new(2, 2));
    replacement.fields.insert("flag".to_string(), "off".to_string());
    let record = project.replace_object(0, 0, replacement);
    project.history.push(record);

    // 7: delete the second
    let record = project.delete_objects(0, vec![1]);
    project.history.push(record);

    // 8: cut a collision region
    project.levels[0].collision_layer.canvas.select_rect(Rectangle::from(0, 0, 3, 3), true);
    let (buffer, record) = project.cut_layer(LayerTarget::Collision(0));
    project.history.push(record);

    // 9: paste it back shifted
    let record = project.paste_layer(LayerTarget::Collision(0), &buffer, Position::new(4, 4));
    project.history.push(record);

    // 10: grow the palette
    let record = project.set_palette_count(4);
    project.history.push(record);

    let edited = document_bytes(&project);
    assert_ne!(initial, edited);
    assert_eq!(project.history.undo_depth(), 10);

    while project.history.can_undo() {
        project.undo();
    }
    assert_eq!(document_bytes(&project), initial);
    assert_eq!(project.history.redo_depth(), 10);

    while project.history.can_redo() {
        project.redo();
    }
    assert_eq!(document_bytes(&project), edited);

    // and the whole cycle is repeatable
    while project.history.can_undo() {
        project.undo();
    }
    assert_eq!(document_bytes(&project), initial);
}

#[test]
fn applying_a_command_twice_is_the_identity() {
    let mut project = Project::default();
    project.levels[0].chr_layer.set((3, 3), 0x41);
    let before = document_bytes(&project);

    let command = chrforge_engine::EditCommand::SetTiles {
        target: LayerTarget::Chr(0),
        rect: Rectangle::from(2, 2, 3, 3),
        tiles: vec![1, 2, 3, 4, 5, 6, 7, 8, 9],
    };
    let inverse = project.apply(command);
    let restore = project.apply(inverse);
    assert_eq!(document_bytes(&project), before);

    project.apply(restore);
    assert_eq!(project.levels[0].chr_layer.get((3, 3)), 5);
}

#[test]
fn soft_noops_leave_no_history() {
    let mut project = Project::default();
    let record = project.fill_layer(LayerTarget::Collision(0));
    project.history.push(record);
    let record = project.fill_paste_layer(LayerTarget::Chr(0), &chrforge_engine::TileBuffer::default());
    project.history.push(record);
    let record = project.delete_objects(0, vec![]);
    project.history.push(record);
    assert!(!project.history.can_undo());
}

#[test]
fn dirty_flags_track_command_application() {
    let mut project = Project::default();
    assert!(!project.modified);
    project.apply(chrforge_engine::EditCommand::SetPaletteCount { count: 2 });
    assert!(project.modified);
    assert!(project.modified_since_save);
    project.mark_saved();
    assert!(!project.modified_since_save);
    assert!(project.modified);
}
