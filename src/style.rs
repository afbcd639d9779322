use serde::{Deserialize, Serialize};

// Limits & defaults
//------------------------------------------------------------------------------

pub const MIN_SIZE: u32 = 128;
pub const MAX_SIZE: u32 = 1024;
pub const MAX_MARGIN: u32 = 24;

pub const DEFAULT_SIZE: u32 = 320;
pub const DEFAULT_MARGIN: u32 = 10;
pub const DEFAULT_DARK_A: &str = "#06b6d4";
pub const DEFAULT_DARK_B: &str = "#7c3aed";
pub const DEFAULT_LIGHT: &str = "#ffffff";
pub const DEFAULT_EYE: &str = "#0b1220";

// Shapes
//------------------------------------------------------------------------------

/// Shape of an individual data module.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleShape {
    Square,
    Rounded,
    Dots,
}

/// Shape of the 7x7 eye frame in each corner.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameShape {
    Square,
    Dots,
    ExtraRounded,
}

/// Shape of the 3x3 pip at the center of each eye.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipShape {
    Square,
    Dot,
}

// Style config
//------------------------------------------------------------------------------

/// Visual configuration for the styled renderer. All fields are independently
/// defaulted; records stored by older versions deserialize with the defaults
/// filled in for whatever they are missing.
///
/// Field names in the serialized form match the original storage blob
/// (`useGradient`, `dotType`, `cornerSquareType`, ...).
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleConfig {
    pub size: u32,
    pub margin: u32,
    pub use_gradient: bool,
    pub dark_a: String,
    pub dark_b: String,
    pub gradient_rotation: f32,
    pub light_color: String,
    #[serde(rename = "dotType")]
    pub module_shape: ModuleShape,
    #[serde(rename = "cornerSquareType")]
    pub frame_shape: FrameShape,
    #[serde(rename = "cornerDotType")]
    pub pip_shape: PipShape,
    pub eye_color: String,
    pub logo_data_url: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            margin: DEFAULT_MARGIN,
            use_gradient: true,
            dark_a: DEFAULT_DARK_A.to_string(),
            dark_b: DEFAULT_DARK_B.to_string(),
            gradient_rotation: 0.0,
            light_color: DEFAULT_LIGHT.to_string(),
            module_shape: ModuleShape::Rounded,
            frame_shape: FrameShape::ExtraRounded,
            pip_shape: PipShape::Dot,
            eye_color: DEFAULT_EYE.to_string(),
            logo_data_url: String::new(),
        }
    }
}

impl StyleConfig {
    /// Clamp numeric fields into their documented ranges.
    pub fn normalize(&mut self) {
        self.size = self.size.clamp(MIN_SIZE, MAX_SIZE);
        self.margin = self.margin.min(MAX_MARGIN);
        self.gradient_rotation = self.gradient_rotation.rem_euclid(360.0);
    }

    /// Style as the fallback renderer sees it: size and margin survive, every
    /// other knob reverts to its default so styling fields are true no-ops.
    pub fn reduced(&self) -> Self {
        Self { size: self.size, margin: self.margin, ..Self::default() }
    }
}
