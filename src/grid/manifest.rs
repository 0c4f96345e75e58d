use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::assets::source::ImageSource;
use crate::foundation::core::GRID_CELLS;
use crate::foundation::error::{ColorWalkError, ColorWalkResult};
use crate::grid::state::Grid;

/// On-disk description of a grid: up to nine optional image paths, row-major.
///
/// ```json
/// { "slots": ["a.jpg", null, "b.png"] }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridManifest {
    /// Image path per slot; `null` leaves the slot empty.
    pub slots: Vec<Option<PathBuf>>,
}

impl GridManifest {
    /// Parse a manifest from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> ColorWalkResult<Self> {
        let manifest: Self = serde_json::from_reader(r)
            .map_err(|e| ColorWalkError::validation(format!("parse grid JSON: {e}")))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse a manifest file.
    pub fn from_path(path: impl AsRef<Path>) -> ColorWalkResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ColorWalkError::validation(format!("open grid JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    fn validate(&self) -> ColorWalkResult<()> {
        if self.slots.len() > GRID_CELLS {
            return Err(ColorWalkError::validation(format!(
                "grid JSON lists {} slots, at most {GRID_CELLS} allowed",
                self.slots.len()
            )));
        }
        Ok(())
    }

    /// Load every listed image, resolving relative paths against `root`.
    pub fn load(&self, root: &Path) -> ColorWalkResult<Grid> {
        self.validate()?;
        let sources = self
            .slots
            .iter()
            .map(|slot| {
                slot.as_ref()
                    .map(|p| ImageSource::from_path(resolve(root, p)))
                    .transpose()
            })
            .collect::<ColorWalkResult<Vec<_>>>()?;
        Grid::from_sources(sources)
    }
}

/// Load a manifest file, resolving its paths relative to the file's directory.
pub fn load_grid(path: impl AsRef<Path>) -> ColorWalkResult<Grid> {
    let path = path.as_ref();
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    GridManifest::from_path(path)?.load(root)
}

fn resolve(root: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grid/manifest.rs"]
mod tests;
