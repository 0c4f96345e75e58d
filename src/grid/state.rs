use crate::assets::source::ImageSource;
use crate::foundation::core::GRID_CELLS;
use crate::foundation::error::{ColorWalkError, ColorWalkResult};

/// State of one grid position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GridSlot {
    /// Nothing selected; drawn as a placeholder.
    #[default]
    Empty,
    /// An image selected for this position.
    Filled(ImageSource),
}

impl GridSlot {
    /// Whether the slot has no image.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The selected image, if any.
    pub fn source(&self) -> Option<&ImageSource> {
        match self {
            Self::Empty => None,
            Self::Filled(src) => Some(src),
        }
    }
}

/// The nine slots of a collage, row-major.
///
/// Updates never mutate in place: `with_*` methods return a new grid and leave `self` as it was,
/// so a grid handed to the compositor cannot change underneath it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grid {
    slots: [GridSlot; GRID_CELLS],
}

impl Grid {
    /// All slots empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from up to nine optional sources; missing trailing entries are empty.
    pub fn from_sources<I>(sources: I) -> ColorWalkResult<Self>
    where
        I: IntoIterator<Item = Option<ImageSource>>,
    {
        let mut grid = Self::new();
        for (idx, src) in sources.into_iter().enumerate() {
            if idx >= GRID_CELLS {
                return Err(ColorWalkError::validation(format!(
                    "a grid holds at most {GRID_CELLS} slots"
                )));
            }
            if let Some(src) = src {
                grid.slots[idx] = GridSlot::Filled(src);
            }
        }
        Ok(grid)
    }

    /// Slot at `index`, if in range.
    pub fn slot(&self, index: usize) -> Option<&GridSlot> {
        self.slots.get(index)
    }

    /// Every slot in index order.
    pub fn slots(&self) -> &[GridSlot; GRID_CELLS] {
        &self.slots
    }

    /// Number of filled slots.
    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    /// Whether every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.filled_count() == 0
    }

    /// A copy with `index` set to `source` (replacing any previous selection).
    pub fn with_slot(&self, index: usize, source: ImageSource) -> ColorWalkResult<Self> {
        self.with(index, GridSlot::Filled(source))
    }

    /// A copy with `index` emptied.
    pub fn with_cleared(&self, index: usize) -> ColorWalkResult<Self> {
        self.with(index, GridSlot::Empty)
    }

    /// A copy with every slot emptied.
    pub fn cleared(&self) -> Self {
        Self::new()
    }

    fn with(&self, index: usize, slot: GridSlot) -> ColorWalkResult<Self> {
        check_index(index)?;
        let mut next = self.clone();
        next.slots[index] = slot;
        Ok(next)
    }
}

pub(crate) fn check_index(index: usize) -> ColorWalkResult<()> {
    if index >= GRID_CELLS {
        return Err(ColorWalkError::validation(format!(
            "slot index {index} out of range (0..{GRID_CELLS})"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/grid/state.rs"]
mod tests;
