//! The binary project file: a 7-byte magic, a version byte, then every
//! document section in fixed order, little-endian, with NUL-terminated
//! strings. Counts stored in one byte use the 0-as-256 convention where
//! noted. This format is the interoperability contract.

use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::{relative_path, resolve_path};
use crate::{ChrSource, ClassField, EngineError, EngineResult, Level, Object, ObjectClass, Position, Project, Size, SourceLoader};

/// Magic literal opening every project file.
pub const FILE_MAGIC: &[u8; 7] = b"8x8Fab\0";
/// Newest file version this reader understands.
pub const FILE_VERSION: u8 = 1;

struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8], start: u64) -> Self {
        let mut cursor = Cursor::new(data);
        cursor.set_position(start);
        ByteReader { cursor }
    }

    fn offset(&self) -> usize {
        self.cursor.position() as usize
    }

    fn u8(&mut self) -> EngineResult<u8> {
        let offset = self.offset();
        self.cursor.read_u8().map_err(|_| EngineError::out_of_bounds(offset))
    }

    /// One-byte count with the 0-as-256 convention.
    fn count8(&mut self) -> EngineResult<usize> {
        let value = self.u8()?;
        Ok(if value == 0 { 256 } else { usize::from(value) })
    }

    fn u16(&mut self) -> EngineResult<u16> {
        let offset = self.offset();
        self.cursor.read_u16::<LittleEndian>().map_err(|_| EngineError::out_of_bounds(offset))
    }

    fn u32(&mut self) -> EngineResult<u32> {
        let offset = self.offset();
        self.cursor.read_u32::<LittleEndian>().map_err(|_| EngineError::out_of_bounds(offset))
    }

    fn string(&mut self) -> EngineResult<String> {
        let mut bytes = Vec::new();
        loop {
            let byte = self.u8()?;
            if byte == 0 {
                break;
            }
            bytes.push(byte);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn path(&mut self, base_dir: &Path) -> EngineResult<std::path::PathBuf> {
        let stored = self.string()?;
        Ok(resolve_path(&stored, base_dir))
    }
}

fn write_str(out: &mut Vec<u8>, value: &str) -> EngineResult<()> {
    out.extend_from_slice(value.as_bytes());
    out.write_u8(0)?;
    Ok(())
}

impl Project {
    /// Encodes the project; `base_dir` is the directory the file will live
    /// in, used to relativize source paths.
    pub fn write_file(&self, base_dir: &Path) -> EngineResult<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(FILE_MAGIC);
        out.write_u8(FILE_VERSION)?;

        // Collision mask reference
        out.write_u8(self.metatile_size)?;
        write_str(&mut out, &relative_path(&self.collision_path, base_dir))?;

        // CHR sources (count is 0-as-256)
        out.write_u8(self.chr_sources.len() as u8)?;
        for source in &self.chr_sources {
            out.write_u16::<LittleEndian>(source.id)?;
            write_str(&mut out, &source.name)?;
            write_str(&mut out, &relative_path(&source.path, base_dir))?;
        }

        // Palette rows: the count governs the visible rows, the data block
        // is always the whole color grid
        out.write_u8(self.palette.count() as u8)?;
        for &value in self.palette.colors.tiles.iter() {
            out.write_u8(value as u8)?;
        }

        // Object classes (count is 0-as-256)
        out.write_u8(self.object_classes.len() as u8)?;
        for class in &self.object_classes {
            write_str(&mut out, &class.name)?;
            write_str(&mut out, &class.macro_name)?;
            out.write_u8(class.color.r)?;
            out.write_u8(class.color.g)?;
            out.write_u8(class.color.b)?;
            out.write_u8(class.fields.len() as u8)?;
            for field in &class.fields {
                write_str(&mut out, &field.name)?;
                write_str(&mut out, &field.type_tag)?;
            }
        }

        // Levels
        out.write_u16::<LittleEndian>(self.levels.len() as u16)?;
        for level in &self.levels {
            write_str(&mut out, &level.name)?;
            write_str(&mut out, &level.macro_name)?;
            write_str(&mut out, &level.chr_name)?;
            out.write_u8(level.palette_index)?;
            let size = level.get_size();
            out.write_u16::<LittleEndian>(size.width as u16)?;
            out.write_u16::<LittleEndian>(size.height as u16)?;
            for &tile in level.chr_layer.tiles.iter() {
                out.write_u32::<LittleEndian>(tile)?;
            }
            for &cell in level.collision_layer.tiles.iter() {
                out.write_u8(cell as u8)?;
            }
            out.write_u16::<LittleEndian>(level.objects.len() as u16)?;
            for object in &level.objects {
                write_str(&mut out, &object.name)?;
                write_str(&mut out, &object.class_name)?;
                out.write_u16::<LittleEndian>(object.position.x as u16)?;
                out.write_u16::<LittleEndian>(object.position.y as u16)?;
                // field values in the resolved class's field order; a single
                // zero byte stands in for any field the object doesn't carry
                if let Some(class) = self.object_class(&object.class_name) {
                    for field in &class.fields {
                        match object.fields.get(&field.name) {
                            Some(value) => write_str(&mut out, value)?,
                            None => out.write_u8(0)?,
                        }
                    }
                } else {
                    log::warn!("object '{}' references unknown class '{}'", object.name, object.class_name);
                }
            }
        }

        Ok(out)
    }

    /// Decodes a project file. Builds a fresh project; the previous
    /// in-memory state is untouched on failure. `loader` supplies the
    /// derived CHR and collision data for the referenced source paths.
    pub fn read_file(data: &[u8], base_dir: &Path, loader: &mut dyn SourceLoader) -> EngineResult<Project> {
        if data.len() < FILE_MAGIC.len() + 1 {
            return Err(EngineError::FileTooShort);
        }
        if &data[..FILE_MAGIC.len()] != FILE_MAGIC {
            return Err(EngineError::IdMismatch);
        }
        let version = data[FILE_MAGIC.len()];
        if version > FILE_VERSION {
            return Err(EngineError::UnsupportedVersion { version });
        }

        let mut reader = ByteReader::new(data, (FILE_MAGIC.len() + 1) as u64);
        let mut project = Project::bare();

        // Collision mask reference
        project.metatile_size = reader.u8()?;
        project.collision_path = reader.path(base_dir)?;
        let scale = project.collision_scale() as u32;
        project.collision_tiles = loader.load_collision_mask(&project.collision_path, scale)?;

        // CHR sources
        let source_count = reader.count8()?;
        for _ in 0..source_count {
            let id = reader.u16()?;
            let name = reader.string()?;
            let mut source = ChrSource::new(id, name);
            source.path = reader.path(base_dir)?;
            source.reload(loader)?;
            project.chr_sources.push(source);
        }

        // Palette rows
        let rows = reader.count8()?;
        project.palette.set_count(rows as u32);
        for value in project.palette.colors.tiles.iter_mut() {
            *value = u32::from(reader.u8()?);
        }

        // Object classes
        let class_count = reader.count8()?;
        for _ in 0..class_count {
            let mut class = ObjectClass::new(reader.string()?);
            class.macro_name = reader.string()?;
            class.color.r = reader.u8()?;
            class.color.g = reader.u8()?;
            class.color.b = reader.u8()?;
            let field_count = reader.u8()?;
            for _ in 0..field_count {
                let name = reader.string()?;
                let type_tag = reader.string()?;
                class.fields.push(ClassField { name, type_tag });
            }
            project.object_classes.push(class);
        }

        // Levels
        let level_count = reader.u16()?;
        for _ in 0..level_count {
            let mut level = Level::new(reader.string()?);
            level.macro_name = reader.string()?;
            level.chr_name = reader.string()?;
            level.palette_index = reader.u8()?;
            let size = Size::from((reader.u16()?, reader.u16()?));
            let collision_size = project.collision_div(size);
            level.resize(size, collision_size);
            for tile in level.chr_layer.tiles.iter_mut() {
                *tile = reader.u32()?;
            }
            for cell in level.collision_layer.tiles.iter_mut() {
                *cell = u32::from(reader.u8()?);
            }
            let object_count = reader.u16()?;
            for _ in 0..object_count {
                let name = reader.string()?;
                let class_name = reader.string()?;
                let position = Position::new(i32::from(reader.u16()?), i32::from(reader.u16()?));
                let mut object = Object::new(class_name, position);
                object.name = name;
                if let Some(class) = project.object_class(&object.class_name) {
                    for field in &class.fields {
                        object.fields.insert(field.name.clone(), reader.string()?);
                    }
                } else {
                    log::warn!("loaded object '{}' references unknown class '{}'", object.name, object.class_name);
                }
                level.objects.push(object);
            }
            project.levels.push(level);
        }

        Ok(project)
    }
}
