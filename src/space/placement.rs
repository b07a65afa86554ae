//! JSON placement definitions: which clip file to play and where its pawns stand.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{mirror_cell, RequirementRole, SpaceRequirement};
use crate::util::{IVec2, Result};

/// Extension appended to data paths that have none.
pub const CLIP_EXTENSION: &str = "anim";

/// Directory under a content root holding clip files.
pub const ANIMATIONS_DIR: &str = "Animations";

/// What a clip is played for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKind {
    #[default]
    Execution,
    Duel,
    Other,
}

/// Placement definition of one clip.
///
/// ```json
/// {
///   "name": "Stab",
///   "kind": "execution",
///   "pawn_count": 2,
///   "data": "Execution/Stab",
///   "cell_data": [
///     { "type": "pawn_start", "pawn": 1, "area": { "x": 1, "y": 0, "width": 1, "height": 1 } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementDef {
    pub name: String,
    pub kind: PlacementKind,
    pub pawn_count: u32,
    /// Clip path relative to the animations directory.
    pub data: String,
    pub relative_probability: f32,
    pub cell_data: Vec<SpaceRequirement>,
}

impl Default for PlacementDef {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: PlacementKind::Execution,
            pawn_count: 0,
            data: String::new(),
            relative_probability: 1.0,
            cell_data: Vec::new(),
        }
    }
}

impl PlacementDef {
    /// Parse a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a list of definitions from a JSON array.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a definition from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Path of the clip file under `root`.
    ///
    /// `.anim` is appended when the data path has no extension.
    pub fn full_data_path(&self, root: impl AsRef<Path>) -> PathBuf {
        let mut relative = PathBuf::from(self.data.trim());
        if relative.extension().is_none() {
            relative.set_extension(CLIP_EXTENSION);
        }
        root.as_ref().join(ANIMATIONS_DIR).join(relative)
    }

    /// Authoring mistakes in this definition, one message each.
    pub fn config_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.kind == PlacementKind::Execution && self.pawn_count < 2 {
            errors.push(format!(
                "Animation kind is execution, but pawn_count is less than 2 ({})",
                self.pawn_count
            ));
        }
        if self.data.trim().is_empty() {
            errors.push("Animation has no data path".to_string());
        }
        if self.kind == PlacementKind::Execution {
            let start = self.try_get_cell(RequirementRole::PawnStart, 1, false, false);
            if start != Some(IVec2::new(1, 0)) {
                errors.push(format!(
                    "Execution should start pawn 1 at offset (1, 0), but starts it at {start:?}"
                ));
            }
        }
        for (i, req) in self.cell_data.iter().enumerate() {
            for error in req.config_errors() {
                errors.push(format!("[cell_data, index:{i}] {error}"));
            }
        }
        for error in &errors {
            warn!(def = %self.name, "{}", error);
        }
        errors
    }

    /// First cell of the first entry with this role and pawn.
    pub fn try_get_cell(&self, role: RequirementRole, pawn: u8, mirror_x: bool, mirror_y: bool) -> Option<IVec2> {
        self.cell_data
            .iter()
            .find(|r| r.matches(role, pawn))
            .map(|r| r.first_cell(mirror_x, mirror_y))
    }

    /// Every cell of every entry with this role and pawn.
    pub fn cells_of(
        &self,
        role: RequirementRole,
        pawn: u8,
        mirror_x: bool,
        mirror_y: bool,
    ) -> impl Iterator<Item = IVec2> + '_ {
        self.cell_data
            .iter()
            .filter(move |r| r.matches(role, pawn))
            .flat_map(move |r| r.cells(mirror_x, mirror_y))
    }

    /// Cells that must be free to play the clip, mirrored, then shifted by `offset`.
    ///
    /// Every entry counts, so pawn start and end cells are included.
    pub fn must_be_clear_cells(&self, mirror_x: bool, mirror_y: bool, offset: IVec2) -> impl Iterator<Item = IVec2> + '_ {
        self.cell_data
            .iter()
            .flat_map(|r| r.area.positions())
            .map(move |c| mirror_cell(c, mirror_x, mirror_y) + offset)
    }
}
