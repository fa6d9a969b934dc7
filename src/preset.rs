use std::collections::{hash_map::Entry::*, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::ColorSpec;
use crate::config::EffectParameters;

const PRESETS_JSON: &str = include_str!("presets.json");

#[derive(Debug, Deserialize, Serialize)]
pub struct WirePresetDb {
    presets: Vec<WirePreset>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WirePreset {
    name: String,
    background: String,
    colors: Vec<String>,
}

/// A named background and color list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preset {
    pub name: String,
    pub background: ColorSpec,
    pub colors: Vec<ColorSpec>,
}

impl Preset {
    /// Replaces the background and foreground colors of `params`, keeping every other knob.
    pub fn apply(&self, params: &mut EffectParameters) {
        params.background = self.background;
        params.colors.clone_from(&self.colors);
    }
}

#[derive(Debug)]
pub struct PresetDb {
    presets: Vec<Preset>,
    by_key: HashMap<String, usize>,
}

#[derive(Debug)]
pub enum PresetError {
    Json(serde_json::Error),
    DuplicatePreset { name: String },
    NoColors { preset: String },
    InvalidColor { color: String, preset: String },
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::Json(e) => write!(f, "malformed preset data: {}", e),
            PresetError::DuplicatePreset { name } => write!(f, "duplicate preset {:?}", name),
            PresetError::NoColors { preset } => write!(f, "preset {:?} has no colors", preset),
            PresetError::InvalidColor { color, preset } => {
                write!(f, "preset {:?} has invalid color {:?}", preset, color)
            }
        }
    }
}

impl std::error::Error for PresetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PresetError::Json(e) => Some(e),
            _ => None,
        }
    }
}

/// Folds case and drops everything but letters and digits, so `"Ocean Breeze"`,
/// `"ocean-breeze"`, and `"OCEAN_BREEZE"` name the same preset.
fn lookup_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl PresetDb {
    pub fn from_bundle() -> Self {
        PresetDb::from_json(PRESETS_JSON).expect("bundled presets are not a valid database")
    }

    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        let wire: WirePresetDb = serde_json::from_str(json).map_err(PresetError::Json)?;
        PresetDb::from_wire(wire)
    }

    /// Unlike parameters entered by hand, preset colors must be well-formed: a typo in a preset
    /// file is reported rather than rendered as black.
    pub fn from_wire(wire: WirePresetDb) -> Result<Self, PresetError> {
        let mut db = PresetDb {
            presets: Vec::with_capacity(wire.presets.len()),
            by_key: HashMap::with_capacity(wire.presets.len()),
        };

        for WirePreset {
            name,
            background,
            colors,
        } in wire.presets
        {
            match db.by_key.entry(lookup_key(&name)) {
                Occupied(_) => return Err(PresetError::DuplicatePreset { name }),
                Vacant(v) => v.insert(db.presets.len()),
            };
            if colors.is_empty() {
                return Err(PresetError::NoColors { preset: name });
            }
            let parse = |color: String| -> Result<ColorSpec, PresetError> {
                ColorSpec::parse(&color).ok_or_else(|| PresetError::InvalidColor {
                    color,
                    preset: name.clone(),
                })
            };
            let background = parse(background)?;
            let colors = colors
                .into_iter()
                .map(parse)
                .collect::<Result<Vec<ColorSpec>, PresetError>>()?;
            db.presets.push(Preset {
                name,
                background,
                colors,
            });
        }

        Ok(db)
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(*self.by_key.get(&lookup_key(name))?)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
