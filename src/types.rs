//! Shared types and enums used across endocrop.
//! Includes `ImageShape`, the crop rectangle `CropRect`, the output
//! extension policy `OutputExtension`, and the exit-status `FailurePolicy`.
use std::str::FromStr;

use clap::ValueEnum;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Number of channels every decoded image is normalized to.
pub const RGB_CHANNELS: u32 = 3;

/// Pixel buffer shape as (height, width, channels).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ImageShape {
    pub height: u32,
    pub width: u32,
    pub channels: u32,
}

impl ImageShape {
    pub fn new(height: u32, width: u32, channels: u32) -> Self {
        Self {
            height,
            width,
            channels,
        }
    }

    pub fn of_rgb(image: &RgbImage) -> Self {
        Self::new(image.height(), image.width(), RGB_CHANNELS)
    }
}

impl std::fmt::Display for ImageShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.height, self.width, self.channels)
    }
}

impl FromStr for ImageShape {
    type Err = String;

    /// Parses `HxWxC`, e.g. `1080x1920x3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(['x', 'X']).collect();
        if parts.len() != 3 {
            return Err(format!("expected HxWxC, got '{}'", s));
        }
        let mut dims = [0u32; 3];
        for (dim, part) in dims.iter_mut().zip(&parts) {
            *dim = part
                .parse::<u32>()
                .map_err(|_| format!("invalid dimension '{}' in '{}'", part, s))?;
            if *dim == 0 {
                return Err(format!("dimensions must be positive, got '{}'", s));
            }
        }
        Ok(Self::new(dims[0], dims[1], dims[2]))
    }
}

/// Axis-aligned crop rectangle in pixel coordinates.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputExtension {
    #[default]
    Jpg,
    Png,
}

impl OutputExtension {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputExtension::Jpg => "jpg",
            OutputExtension::Png => "png",
        }
    }
}

impl std::fmt::Display for OutputExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether per-file failures should turn into a failed run.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Report failures in the summary, exit successfully
    #[default]
    Ignore,
    /// Exit with an error if any task failed
    Fail,
}
