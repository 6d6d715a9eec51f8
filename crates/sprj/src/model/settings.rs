//! Project settings entries consumed by UI collaborators

use super::ShaderStageKind;
use serde::{Serialize, Serializer};
use xmltree::Element;

/// Saved camera placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CameraSettings {
    FirstPerson { position: [f32; 3], yaw: f32, pitch: f32 },
    ArcBall { distance: f32, pitch: f32, yaw: f32, roll: f32 },
}

/// One entry of the settings section, kept in document order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SettingEntry {
    /// Item shown in the property panel
    Property { name: String },
    /// Shader stage of a pass open in the code editor
    File { name: String, stage: ShaderStageKind },
    /// Variable pinned to the quick-edit panel
    Pinned { name: String, owner: String },
    Camera(CameraSettings),
    /// Preview clear color (r, g, b, a) in 0..1
    ClearColor([f32; 4]),
    /// Entry of an unknown type, preserved verbatim
    Other(#[serde(serialize_with = "serialize_entry_type")] Element),
}

fn serialize_entry_type<S: Serializer>(element: &Element, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(element.attributes.get("type").map(String::as_str).unwrap_or_default())
}
