use std::path::Path;

use crate::chr::{png_to_tiles, ChrPatterns};
use crate::collision::{load_collision_mask, CollisionTile};
use crate::EngineResult;

/// Supplies derived data for source paths referenced by a project. The model
/// calls this on load and on refresh; implementations decide where the bytes
/// come from.
pub trait SourceLoader {
    /// Tile bytes and source-block index list for a CHR source path.
    fn load_chr(&mut self, path: &Path) -> EngineResult<ChrPatterns>;

    /// Collision tile bitmaps for a mask path at the given scale.
    fn load_collision_mask(&mut self, path: &Path, scale: u32) -> EngineResult<Vec<CollisionTile>>;
}

/// Filesystem-backed loader. A missing or empty source degrades to empty
/// derived data; a file that exists but fails to decode is an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load_chr(&mut self, path: &Path) -> EngineResult<ChrPatterns> {
        if path.as_os_str().is_empty() {
            return Ok(ChrPatterns::default());
        }
        let Ok(bytes) = std::fs::read(path) else {
            log::warn!("CHR source {} is not readable, leaving it empty", path.display());
            return Ok(ChrPatterns::default());
        };
        if bytes.is_empty() {
            return Ok(ChrPatterns::default());
        }

        let is_png = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png {
            png_to_tiles(&bytes)
        } else {
            Ok(ChrPatterns::from_raw(&bytes))
        }
    }

    fn load_collision_mask(&mut self, path: &Path, scale: u32) -> EngineResult<Vec<CollisionTile>> {
        if path.as_os_str().is_empty() || scale == 0 {
            return Ok(Vec::new());
        }
        let Ok(bytes) = std::fs::read(path) else {
            log::warn!("collision mask {} is not readable, leaving it empty", path.display());
            return Ok(Vec::new());
        };
        match load_collision_mask(&bytes, scale) {
            Ok(tiles) => Ok(tiles),
            Err(err) => {
                log::warn!("collision mask {} failed to decode: {err}", path.display());
                Ok(Vec::new())
            }
        }
    }
}

/// Loader that never supplies any derived data. Useful for headless tools
/// that only rewrite project structure.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLoader;

impl SourceLoader for NullLoader {
    fn load_chr(&mut self, _path: &Path) -> EngineResult<ChrPatterns> {
        Ok(ChrPatterns::default())
    }

    fn load_collision_mask(&mut self, _path: &Path, _scale: u32) -> EngineResult<Vec<CollisionTile>> {
        Ok(Vec::new())
    }
}
