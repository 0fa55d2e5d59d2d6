use std::path::Path;

use pretty_assertions::assert_eq;

use chrforge_engine::{
    ClassField, LayerTarget, NullLoader, Object, ObjectClass, Position, Project, Rectangle, Size,
};

fn clear_selections(project: &mut Project) {
    project.palette.colors.picker.select_all(false);
    project.palette.colors.canvas.select_all(false);
    for level in &mut project.levels {
        level.chr_layer.picker.select_all(false);
        level.chr_layer.canvas.select_all(false);
        level.collision_layer.picker.select_all(false);
        level.collision_layer.canvas.select_all(false);
    }
}

#[test]
fn binary_roundtrip_empty_default_project() {
    let project = Project::default();
    let data = project.write_file(Path::new("")).unwrap();
    let loaded = Project::read_file(&data, Path::new(""), &mut NullLoader).unwrap();
    assert_eq!(loaded, project);
}

#[test]
fn binary_roundtrip_selection_filled_pattern() {
    let mut project = Project::default();

    // non-rectangular canvas selection, filled from a 2x2 picker block
    {
        let layer = &mut project.levels[0].chr_layer;
        layer.kind.attribute = 2;
        layer.kind.bank = 1;
        layer.picker.select_rect(Rectangle::from(3, 0, 2, 2), true);
        layer.canvas.select_rect(Rectangle::from(0, 0, 5, 5), true);
        layer.canvas.select((0, 0), false);
        layer.canvas.select((4, 4), false);
    }
    let record = project.fill_layer(LayerTarget::Chr(0));
    project.history.push(record);
    project.levels[0].collision_layer.set((2, 3), 9);

    let data = project.write_file(Path::new("")).unwrap();
    let loaded = Project::read_file(&data, Path::new(""), &mut NullLoader).unwrap();

    assert_eq!(loaded.levels[0].chr_layer.tiles, project.levels[0].chr_layer.tiles);
    assert_eq!(loaded.levels[0].collision_layer.tiles, project.levels[0].collision_layer.tiles);
    // the fill really wrote something
    assert_ne!(loaded.levels[0].chr_layer.get((1, 0)), 0);
    // corner cells were deselected before the fill
    assert_eq!(loaded.levels[0].chr_layer.get((0, 0)), 0);
}

#[test]
fn binary_roundtrip_objects_with_omitted_fields() {
    let mut project = Project::default();
    let mut class = ObjectClass::new("enemy");
    class.macro_name = "spawn_enemy".to_string();
    class.color = rgb::RGB8 { r: 10, g: 20, b: 30 };
    class.fields.push(ClassField {
        name: "health".to_string(),
        type_tag: "U".to_string(),
    });
    class.fields.push(ClassField {
        name: "speed".to_string(),
        type_tag: "S".to_string(),
    });
    project.object_classes.push(class);

    let mut with_field = Object::new("enemy", Position::new(4, 5));
    with_field.name = "slime".to_string();
    with_field.fields.insert("health".to_string(), "50".to_string());
    let bare = Object::new("enemy", Position::new(6, 7));
    project.levels[0].objects.push(with_field);
    project.levels[0].objects.push(bare);

    let data = project.write_file(Path::new("")).unwrap();
    let loaded = Project::read_file(&data, Path::new(""), &mut NullLoader).unwrap();

    let objects = &loaded.levels[0].objects;
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].name, "slime");
    assert_eq!(objects[0].field("health"), "50");
    assert_eq!(objects[0].field("speed"), "");
    assert_eq!(objects[1].field("health"), "");
    assert_eq!(objects[1].position, Position::new(6, 7));

    let class = loaded.object_class("enemy").unwrap();
    assert_eq!(class.macro_name, "spawn_enemy");
    assert_eq!(class.fields.len(), 2);
    assert_eq!(class.fields[1].type_tag, "S");
}

#[test]
fn binary_roundtrip_palette_and_level_shape() {
    let mut project = Project::default();
    project.metatile_size = 2;
    let record = project.set_palette_count(3);
    project.history.push(record);
    project.palette.colors.set((5, 2), 0x2A);

    let size = Size::new(10, 6);
    let record = project.resize_level(0, size);
    project.history.push(record);
    project.levels[0].chr_layer.set((9, 5), 0x1234);

    let data = project.write_file(Path::new("")).unwrap();
    let loaded = Project::read_file(&data, Path::new(""), &mut NullLoader).unwrap();

    assert_eq!(loaded.palette.count(), 3);
    assert_eq!(loaded.palette.colors.get((5, 2)), 0x2A);
    assert_eq!(loaded.metatile_size, 2);
    assert_eq!(loaded.levels[0].get_size(), size);
    assert_eq!(loaded.levels[0].collision_layer.canvas_size(), Size::new(5, 3));
    assert_eq!(loaded.levels[0].chr_layer.get((9, 5)), 0x1234);
    assert!(!loaded.modified);
}

#[test]
fn binary_paths_are_relative_to_the_file() {
    let base = Path::new("/projects/game");
    let mut project = Project::default();
    project.collision_path = base.join("gfx/mask.png");
    project.chr_sources[0].path = base.join("gfx/tiles.png");

    let data = project.write_file(base).unwrap();
    // the stored form is relative with forward slashes
    let needle = b"gfx/mask.png\0";
    assert!(data.windows(needle.len()).any(|w| w == needle));

    let loaded = Project::read_file(&data, base, &mut NullLoader).unwrap();
    assert_eq!(loaded.collision_path, project.collision_path);
    assert_eq!(loaded.chr_sources[0].path, project.chr_sources[0].path);

    let moved = Project::read_file(&data, Path::new("/elsewhere"), &mut NullLoader).unwrap();
    assert_eq!(moved.collision_path, Path::new("/elsewhere").join("gfx/mask.png"));
}

#[test]
fn json_roundtrip_default_project() {
    let mut project = Project::default();
    let text = project.write_json(Path::new("")).unwrap();
    let loaded = Project::read_json(&text, Path::new(""), &mut NullLoader).unwrap();
    clear_selections(&mut project);
    assert_eq!(loaded, project);
}

#[test]
fn json_roundtrip_keeps_absent_fields_absent() {
    let mut project = Project::default();
    let mut class = ObjectClass::new("door");
    class.fields.push(ClassField {
        name: "key".to_string(),
        type_tag: "U".to_string(),
    });
    project.object_classes.push(class);
    project.levels[0].objects.push(Object::new("door", Position::new(-3, 2)));

    let text = project.write_json(Path::new("")).unwrap();
    let loaded = Project::read_json(&text, Path::new(""), &mut NullLoader).unwrap();

    let object = &loaded.levels[0].objects[0];
    // JSON omits fields the object doesn't carry instead of writing defaults
    assert!(object.fields.is_empty());
    assert_eq!(object.field("key"), "");
    // JSON keeps full signed positions
    assert_eq!(object.position, Position::new(-3, 2));
}

#[test]
fn json_rejects_newer_version() {
    let project = Project::default();
    let text = project.write_json(Path::new("")).unwrap();
    let bumped = text.replace("\"version\": 1", "\"version\": 9");
    assert!(Project::read_json(&bumped, Path::new(""), &mut NullLoader).is_err());
}
