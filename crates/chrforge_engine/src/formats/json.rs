//! Structured, self-describing JSON rendition of the project document. The
//! binary format stays the interoperability contract; this one exists for
//! tooling and diffing. Model types stay serde-free; the codec goes through
//! dedicated document structs.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{relative_path, resolve_path};
use crate::{ChrSource, ClassField, EngineError, EngineResult, Level, Object, ObjectClass, Position, Project, Size, SourceLoader};
use crate::formats::binary::FILE_VERSION;

#[derive(Serialize, Deserialize)]
struct ProjectDoc {
    version: u8,
    metatile_size: u8,
    collision_path: String,
    chr: Vec<ChrDoc>,
    palettes: PaletteDoc,
    object_classes: Vec<ClassDoc>,
    levels: Vec<LevelDoc>,
}

#[derive(Serialize, Deserialize)]
struct ChrDoc {
    id: u16,
    name: String,
    path: String,
}

#[derive(Serialize, Deserialize)]
struct PaletteDoc {
    num: u32,
    data: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct ClassDoc {
    name: String,
    #[serde(rename = "macro")]
    macro_name: String,
    color: [u8; 3],
    fields: Vec<FieldDoc>,
}

#[derive(Serialize, Deserialize)]
struct FieldDoc {
    name: String,
    #[serde(rename = "type")]
    type_tag: String,
}

#[derive(Serialize, Deserialize)]
struct LevelDoc {
    name: String,
    #[serde(rename = "macro")]
    macro_name: String,
    chr: String,
    palette: u8,
    width: i32,
    height: i32,
    tiles: Vec<u32>,
    collisions: Vec<u8>,
    objects: Vec<ObjectDoc>,
}

#[derive(Serialize, Deserialize)]
struct ObjectDoc {
    name: String,
    object_class: String,
    x: i32,
    y: i32,
    fields: BTreeMap<String, String>,
}

impl Project {
    /// Encodes the project as pretty-printed JSON; `base_dir` relativizes
    /// source paths as in the binary format.
    pub fn write_json(&self, base_dir: &Path) -> EngineResult<String> {
        let doc = ProjectDoc {
            version: FILE_VERSION,
            metatile_size: self.metatile_size,
            collision_path: relative_path(&self.collision_path, base_dir),
            chr: self
                .chr_sources
                .iter()
                .map(|source| ChrDoc {
                    id: source.id,
                    name: source.name.clone(),
                    path: relative_path(&source.path, base_dir),
                })
                .collect(),
            palettes: PaletteDoc {
                num: self.palette.count(),
                data: self.palette.colors.tiles.iter().map(|&value| value as u8).collect(),
            },
            object_classes: self
                .object_classes
                .iter()
                .map(|class| ClassDoc {
                    name: class.name.clone(),
                    macro_name: class.macro_name.clone(),
                    color: [class.color.r, class.color.g, class.color.b],
                    fields: class
                        .fields
                        .iter()
                        .map(|field| FieldDoc {
                            name: field.name.clone(),
                            type_tag: field.type_tag.clone(),
                        })
                        .collect(),
                })
                .collect(),
            levels: self.levels.iter().map(|level| self.level_doc(level)).collect(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    fn level_doc(&self, level: &Level) -> LevelDoc {
        let size = level.get_size();
        LevelDoc {
            name: level.name.clone(),
            macro_name: level.macro_name.clone(),
            chr: level.chr_name.clone(),
            palette: level.palette_index,
            width: size.width,
            height: size.height,
            tiles: level.chr_layer.tiles.iter().copied().collect(),
            collisions: level.collision_layer.tiles.iter().map(|&cell| cell as u8).collect(),
            objects: level
                .objects
                .iter()
                .map(|object| {
                    // fields in the resolved class's schema, present ones only
                    let mut fields = BTreeMap::new();
                    if let Some(class) = self.object_class(&object.class_name) {
                        for field in &class.fields {
                            if let Some(value) = object.fields.get(&field.name) {
                                fields.insert(field.name.clone(), value.clone());
                            }
                        }
                    }
                    ObjectDoc {
                        name: object.name.clone(),
                        object_class: object.class_name.clone(),
                        x: object.position.x,
                        y: object.position.y,
                        fields,
                    }
                })
                .collect(),
        }
    }

    /// Decodes the JSON rendition; the version gate matches the binary
    /// reader's.
    pub fn read_json(data: &str, base_dir: &Path, loader: &mut dyn SourceLoader) -> EngineResult<Project> {
        let doc: ProjectDoc = serde_json::from_str(data)?;
        if doc.version > FILE_VERSION {
            return Err(EngineError::UnsupportedVersion { version: doc.version });
        }

        let mut project = Project::bare();
        project.metatile_size = doc.metatile_size;
        project.collision_path = resolve_path(&doc.collision_path, base_dir);
        let scale = project.collision_scale() as u32;
        project.collision_tiles = loader.load_collision_mask(&project.collision_path, scale)?;

        for chr in doc.chr {
            let mut source = ChrSource::new(chr.id, chr.name);
            source.path = resolve_path(&chr.path, base_dir);
            source.reload(loader)?;
            project.chr_sources.push(source);
        }

        project.palette.set_count(doc.palettes.num);
        for (slot, value) in project.palette.colors.tiles.iter_mut().zip(doc.palettes.data) {
            *slot = u32::from(value);
        }

        for class_doc in doc.object_classes {
            let mut class = ObjectClass::new(class_doc.name);
            class.macro_name = class_doc.macro_name;
            class.color.r = class_doc.color[0];
            class.color.g = class_doc.color[1];
            class.color.b = class_doc.color[2];
            class.fields = class_doc
                .fields
                .into_iter()
                .map(|field| ClassField {
                    name: field.name,
                    type_tag: field.type_tag,
                })
                .collect();
            project.object_classes.push(class);
        }

        for level_doc in doc.levels {
            let mut level = Level::new(level_doc.name);
            level.macro_name = level_doc.macro_name;
            level.chr_name = level_doc.chr;
            level.palette_index = level_doc.palette;
            let size = Size::new(level_doc.width, level_doc.height);
            let collision_size = project.collision_div(size);
            level.resize(size, collision_size);
            for (slot, value) in level.chr_layer.tiles.iter_mut().zip(level_doc.tiles) {
                *slot = value;
            }
            for (slot, value) in level.collision_layer.tiles.iter_mut().zip(level_doc.collisions) {
                *slot = u32::from(value);
            }
            for object_doc in level_doc.objects {
                let mut object = Object::new(object_doc.object_class, Position::new(object_doc.x, object_doc.y));
                object.name = object_doc.name;
                object.fields = object_doc.fields.into_iter().collect();
                level.objects.push(object);
            }
            project.levels.push(level);
        }

        Ok(project)
    }
}
