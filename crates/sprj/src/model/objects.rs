//! Scene objects: textures, cubemaps, render targets, audio and buffers

use crate::fields::named_enum;
use bytes::BytesMut;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

named_enum! {
    /// Pixel format of a render target
    #[derive(Default)]
    pub enum TextureFormat {
        #[default]
        Rgba => "RGBA",
        Rgb => "RGB",
        Rg => "RG",
        R => "R",
        Rgba8 => "RGBA8",
        Rgba16 => "RGBA16",
        Rgba16F => "RGBA16F",
        Rgba32F => "RGBA32F",
        Rg8 => "RG8",
        Rg16F => "RG16F",
        Rg32F => "RG32F",
        R8 => "R8",
        R16F => "R16F",
        R32F => "R32F",
        Rgb10A2 => "RGB10_A2",
        R11FG11FB10F => "R11F_G11F_B10F",
        Srgb8Alpha8 => "SRGB8_ALPHA8",
    }
}

/// Size of a render target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RenderTargetSize {
    /// Fixed size in pixels
    Fixed([u32; 2]),
    /// Fraction of the current output size, recomputed on output resize
    Ratio([f32; 2]),
}

impl Default for RenderTargetSize {
    fn default() -> Self {
        Self::Ratio([1.0, 1.0])
    }
}

impl RenderTargetSize {
    /// Computes the pixel size for the given output size
    pub fn calculate(&self, output_size: [u32; 2]) -> [u32; 2] {
        match *self {
            Self::Fixed(size) => size,
            Self::Ratio([x, y]) => [(output_size[0] as f32 * x) as u32, (output_size[1] as f32 * y) as u32],
        }
    }

    /// Parses a fixed `"w,h"` pair
    pub fn parse_fixed(s: &str) -> Result<Self, SizeParseError> {
        let [w, h] = split_pair(s)?;
        let w = w.parse::<u32>().map_err(|_| SizeParseError::InvalidComponent)?;
        let h = h.parse::<u32>().map_err(|_| SizeParseError::InvalidComponent)?;
        Ok(Self::Fixed([w, h]))
    }

    /// Parses a ratio `"x,y"` pair
    pub fn parse_ratio(s: &str) -> Result<Self, SizeParseError> {
        let [x, y] = split_pair(s)?;
        let x = x.parse::<f32>().map_err(|_| SizeParseError::InvalidComponent)?;
        let y = y.parse::<f32>().map_err(|_| SizeParseError::InvalidComponent)?;
        if !x.is_finite() || !y.is_finite() || x <= 0.0 || y <= 0.0 {
            return Err(SizeParseError::NonPositiveRatio);
        }
        Ok(Self::Ratio([x, y]))
    }
}

impl fmt::Display for RenderTargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed([w, h]) => write!(f, "{w},{h}"),
            Self::Ratio([x, y]) => write!(f, "{x},{y}"),
        }
    }
}

fn split_pair(s: &str) -> Result<[&str; 2], SizeParseError> {
    let (a, b) = s.split_once(',').ok_or(SizeParseError::InvalidFormat)?;
    Ok([a.trim(), b.trim()])
}

/// Error types for render-target size parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeParseError {
    /// The format is not recognized (should be "a,b")
    InvalidFormat,
    /// A component is not a valid number
    InvalidComponent,
    /// A ratio component is zero, negative or not finite
    NonPositiveRatio,
}

impl fmt::Display for SizeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat => write!(f, "Invalid size format"),
            Self::InvalidComponent => write!(f, "Invalid size component"),
            Self::NonPositiveRatio => write!(f, "Size ratio must be positive"),
        }
    }
}

impl std::error::Error for SizeParseError {}

impl FromStr for RenderTargetSize {
    type Err = SizeParseError;

    /// Parses `"w,h"` as a fixed size if both parts are integers, otherwise as a ratio
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_fixed(s).or_else(|_| Self::parse_ratio(s))
    }
}

/// Off-screen render target parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTarget {
    pub format: TextureFormat,
    pub size: RenderTargetSize,
    pub clear: bool,
    /// Clear color (r, g, b, a) in 0..1
    pub clear_color: [f32; 4],
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self {
            format: TextureFormat::Rgba,
            size: RenderTargetSize::default(),
            clear: true,
            clear_color: [0.0; 4],
        }
    }
}

/// The six face images of a cubemap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CubemapFaces {
    pub left: String,
    pub top: String,
    pub front: String,
    pub bottom: String,
    pub right: String,
    pub back: String,
}

/// Raw uniform buffer contents
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BufferObject {
    /// Free-form view format tag (e.g. "vec4;float")
    pub format: String,
    /// Exactly `len()` bytes; persisted to `buffers/<name>.buf`
    #[serde(skip)]
    pub data: BytesMut,
}

impl BufferObject {
    /// Creates a zero-filled buffer of the given size
    pub fn zeroed(size: usize, format: impl Into<String>) -> Self {
        Self { format: format.into(), data: BytesMut::zeroed(size) }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Overwrites the start of the buffer with `bytes`, keeping its size
    pub fn fill_from(&mut self, bytes: &[u8]) {
        let len = bytes.len().min(self.data.len());
        self.data[..len].copy_from_slice(&bytes[..len]);
    }
}

/// Object type name used in documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ObjectKind {
    Texture,
    Cubemap,
    RenderTarget,
    Audio,
    Buffer,
}

/// A resource owned by the object registry, referenced from passes by name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SceneObject {
    /// Image texture, named by its project-relative path
    Texture { path: String },
    Cubemap { name: String, faces: CubemapFaces },
    RenderTarget { name: String, target: RenderTarget },
    /// Audio source, named by its project-relative path
    Audio { path: String },
    Buffer { name: String, buffer: BufferObject },
}

impl SceneObject {
    /// The registry key of this object
    pub fn name(&self) -> &str {
        match self {
            Self::Texture { path } | Self::Audio { path } => path,
            Self::Cubemap { name, .. } | Self::RenderTarget { name, .. } | Self::Buffer { name, .. } => name,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Texture { .. } => ObjectKind::Texture,
            Self::Cubemap { .. } => ObjectKind::Cubemap,
            Self::RenderTarget { .. } => ObjectKind::RenderTarget,
            Self::Audio { .. } => ObjectKind::Audio,
            Self::Buffer { .. } => ObjectKind::Buffer,
        }
    }

    /// Returns true if this object binds into the uniform-buffer slot table
    pub fn is_uniform(&self) -> bool {
        matches!(self, Self::Buffer { .. })
    }
}
