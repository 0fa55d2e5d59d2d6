use std::path::PathBuf;

use crate::chr::ChrPatterns;
use crate::editor::UndoStack;
use crate::{CollisionTile, EngineResult, Level, ObjectClass, PaletteModel, Size, SourceLoader};

/// A CHR source descriptor: where the tile graphics come from and the
/// derived data the codec produced for them. Only id, name and path are
/// persisted; patterns are rebuilt on load.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChrSource {
    pub id: u16,
    pub name: String,
    pub path: PathBuf,
    pub patterns: ChrPatterns,
}

impl ChrSource {
    pub fn new(id: u16, name: impl Into<String>) -> Self {
        ChrSource {
            id,
            name: name.into(),
            path: PathBuf::new(),
            patterns: ChrPatterns::default(),
        }
    }

    /// Rebuilds the derived tile data from the source path.
    pub fn reload(&mut self, loader: &mut dyn SourceLoader) -> EngineResult<()> {
        self.patterns = loader.load_chr(&self.path)?;
        Ok(())
    }
}

/// The aggregate root: palette rows, levels, object classes, CHR sources,
/// the collision mask reference, and the undo history.
#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    pub palette: PaletteModel,
    pub levels: Vec<Level>,
    pub object_classes: Vec<ObjectClass>,
    pub chr_sources: Vec<ChrSource>,
    /// Metatile edge; 0 means metatiles are not in use.
    pub metatile_size: u8,
    pub collision_path: PathBuf,
    /// Derived collision tile bitmaps, rebuilt on load/reload.
    pub collision_tiles: Vec<CollisionTile>,
    pub history: UndoStack,
    pub modified: bool,
    pub modified_since_save: bool,
}

impl Default for Project {
    fn default() -> Self {
        let mut level = Level::new("level");
        level.chr_name = "chr".to_string();
        let mut project = Project::bare();
        project.levels.push(level);
        project.object_classes.push(ObjectClass::new("object"));
        project.chr_sources.push(ChrSource::new(0, "chr"));
        project
    }
}

impl Project {
    /// A project with no levels, classes or sources; the deserializers fill
    /// one of these in.
    pub(crate) fn bare() -> Self {
        Project {
            palette: PaletteModel::default(),
            levels: Vec::new(),
            object_classes: Vec::new(),
            chr_sources: Vec::new(),
            metatile_size: 0,
            collision_path: PathBuf::new(),
            collision_tiles: Vec::new(),
            history: UndoStack::default(),
            modified: false,
            modified_since_save: false,
        }
    }

    pub fn mark_modified(&mut self) {
        self.modified = true;
        self.modified_since_save = true;
    }

    pub fn mark_saved(&mut self) {
        self.modified_since_save = false;
    }

    /// How many canvas cells map onto one collision cell per axis.
    pub fn collision_scale(&self) -> i32 {
        i32::from(self.metatile_size).max(1)
    }

    /// The collision canvas size for a graphics canvas of `size`
    /// (ceiling division by the collision scale).
    pub fn collision_div(&self, size: Size) -> Size {
        let scale = self.collision_scale();
        Size::new((size.width + scale - 1) / scale, (size.height + scale - 1) / scale)
    }

    /// The 16-entry render palette of palette row `index`.
    pub fn palette_array(&self, index: u8) -> [u8; 16] {
        self.palette.palette_array(index)
    }

    pub fn object_class(&self, name: &str) -> Option<&ObjectClass> {
        self.object_classes.iter().find(|class| class.name == name)
    }

    pub fn chr_source(&self, name: &str) -> Option<&ChrSource> {
        self.chr_sources.iter().find(|source| source.name == name)
    }

    pub fn chr_source_by_id(&self, id: u16) -> Option<&ChrSource> {
        self.chr_sources.iter().find(|source| source.id == id)
    }

    /// Reloads every derived source: CHR patterns and collision bitmaps.
    pub fn reload_sources(&mut self, loader: &mut dyn SourceLoader) -> EngineResult<()> {
        for source in &mut self.chr_sources {
            source.reload(loader)?;
        }
        let scale = self.collision_scale() as u32;
        self.collision_tiles = loader.load_collision_mask(&self.collision_path, scale)?;
        Ok(())
    }

    /// Rebuilds every level's per-bank render bitmaps from the current
    /// sources and palettes.
    pub fn refresh_chr(&mut self) {
        let palettes: Vec<[u8; 16]> = self.levels.iter().map(|level| self.palette.palette_array(level.palette_index)).collect();
        for (level, palette) in self.levels.iter_mut().zip(palettes) {
            level.refresh_chr(&self.chr_sources, &palette);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_project_contents() {
        let project = Project::default();
        assert_eq!(project.levels.len(), 1);
        assert_eq!(project.levels[0].chr_name, "chr");
        assert_eq!(project.object_classes.len(), 1);
        assert_eq!(project.object_classes[0].name, "object");
        assert_eq!(project.chr_sources.len(), 1);
        assert!(!project.modified);
    }

    #[test]
    fn test_collision_div_rounds_up() {
        let mut project = Project::default();
        project.metatile_size = 2;
        assert_eq!(project.collision_div(Size::new(5, 4)), Size::new(3, 2));
        project.metatile_size = 0;
        assert_eq!(project.collision_scale(), 1);
        assert_eq!(project.collision_div(Size::new(5, 4)), Size::new(5, 4));
    }

    #[test]
    fn test_lookups_are_name_keyed() {
        let project = Project::default();
        assert!(project.object_class("object").is_some());
        assert!(project.object_class("missing").is_none());
        assert!(project.chr_source("chr").is_some());
        assert!(project.chr_source_by_id(0).is_some());
        assert!(project.chr_source_by_id(7).is_none());
    }
}
