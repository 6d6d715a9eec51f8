//! Shader variable value model
//!
//! This module defines the typed shader variables owned by a pass: their declared
//! value type, where their value comes from (user constant, engine-supplied system
//! value, or a built-in function), per-variable flags, and the storage used for the
//! value itself. `VariableStore` keeps variables in insertion order, which is also
//! the order they are serialized in.

use serde::Serialize;
use std::fmt;

/// Size in bytes of the argument buffer used by function-sourced variables
pub const ARGUMENT_BUFFER_SIZE: usize = 512;

/// Declared value type of a shader variable
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueType {
    Bool1,
    Bool2,
    Bool3,
    Bool4,
    Int1,
    Int2,
    Int3,
    Int4,
    #[default]
    Float1,
    Float2,
    Float3,
    Float4,
    Float2x2,
    Float3x3,
    Float4x4,
}

impl ValueType {
    /// Every value type, in document name table order
    pub const ALL: [ValueType; 15] = [
        Self::Bool1,
        Self::Bool2,
        Self::Bool3,
        Self::Bool4,
        Self::Int1,
        Self::Int2,
        Self::Int3,
        Self::Int4,
        Self::Float1,
        Self::Float2,
        Self::Float3,
        Self::Float4,
        Self::Float2x2,
        Self::Float3x3,
        Self::Float4x4,
    ];

    /// Name used for this type in project documents
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool1 => "bool",
            Self::Bool2 => "bool2",
            Self::Bool3 => "bool3",
            Self::Bool4 => "bool4",
            Self::Int1 => "int",
            Self::Int2 => "int2",
            Self::Int3 => "int3",
            Self::Int4 => "int4",
            Self::Float1 => "float",
            Self::Float2 => "float2",
            Self::Float3 => "float3",
            Self::Float4 => "float4",
            Self::Float2x2 => "float2x2",
            Self::Float3x3 => "float3x3",
            Self::Float4x4 => "float4x4",
        }
    }

    /// Looks up a value type by its document name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.name() == name)
    }

    pub fn is_bool(self) -> bool {
        matches!(self, Self::Bool1 | Self::Bool2 | Self::Bool3 | Self::Bool4)
    }

    pub fn is_int(self) -> bool {
        matches!(self, Self::Int1 | Self::Int2 | Self::Int3 | Self::Int4)
    }

    pub fn is_float(self) -> bool {
        !self.is_bool() && !self.is_int()
    }

    pub fn is_matrix(self) -> bool {
        matches!(self, Self::Float2x2 | Self::Float3x3 | Self::Float4x4)
    }

    /// Number of scalar components in one row
    pub fn columns(self) -> usize {
        match self {
            Self::Bool1 | Self::Int1 | Self::Float1 => 1,
            Self::Bool2 | Self::Int2 | Self::Float2 | Self::Float2x2 => 2,
            Self::Bool3 | Self::Int3 | Self::Float3 | Self::Float3x3 => 3,
            Self::Bool4 | Self::Int4 | Self::Float4 | Self::Float4x4 => 4,
        }
    }

    /// Number of rows (1 for every non-matrix type)
    pub fn rows(self) -> usize {
        if self.is_matrix() { self.columns() } else { 1 }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Engine-supplied values a variable can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SystemVariable {
    Time,
    TimeDelta,
    FrameIndex,
    ViewportSize,
    MousePosition,
    View,
    Projection,
    ViewProjection,
    Orthographic,
    ViewOrthographic,
    GeometryTransform,
    IsPicked,
    CameraPosition,
    CameraPosition3,
    CameraDirection3,
    KeysWASD,
    PickPosition,
}

impl SystemVariable {
    pub const ALL: [SystemVariable; 17] = [
        Self::Time,
        Self::TimeDelta,
        Self::FrameIndex,
        Self::ViewportSize,
        Self::MousePosition,
        Self::View,
        Self::Projection,
        Self::ViewProjection,
        Self::Orthographic,
        Self::ViewOrthographic,
        Self::GeometryTransform,
        Self::IsPicked,
        Self::CameraPosition,
        Self::CameraPosition3,
        Self::CameraDirection3,
        Self::KeysWASD,
        Self::PickPosition,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Time => "Time",
            Self::TimeDelta => "TimeDelta",
            Self::FrameIndex => "FrameIndex",
            Self::ViewportSize => "ViewportSize",
            Self::MousePosition => "MousePosition",
            Self::View => "View",
            Self::Projection => "Projection",
            Self::ViewProjection => "ViewProjection",
            Self::Orthographic => "Orthographic",
            Self::ViewOrthographic => "ViewOrthographic",
            Self::GeometryTransform => "GeometryTransform",
            Self::IsPicked => "IsPicked",
            Self::CameraPosition => "CameraPosition",
            Self::CameraPosition3 => "CameraPosition3",
            Self::CameraDirection3 => "CameraDirection3",
            Self::KeysWASD => "KeysWASD",
            Self::PickPosition => "PickPosition",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|system| system.name() == name)
    }

    /// The only value type this system value can be assigned to
    pub fn value_type(self) -> ValueType {
        match self {
            Self::Time | Self::TimeDelta => ValueType::Float1,
            Self::FrameIndex => ValueType::Int1,
            Self::ViewportSize | Self::MousePosition => ValueType::Float2,
            Self::View | Self::Projection | Self::ViewProjection | Self::Orthographic | Self::ViewOrthographic | Self::GeometryTransform => ValueType::Float4x4,
            Self::IsPicked => ValueType::Bool1,
            Self::CameraPosition => ValueType::Float4,
            Self::CameraPosition3 | Self::CameraDirection3 | Self::PickPosition => ValueType::Float3,
            Self::KeysWASD => ValueType::Int4,
        }
    }
}

/// Built-in per-frame functions a variable can be computed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FunctionKind {
    /// Mirrors another variable; the single argument is the target variable's name
    Pointer,
    MatrixIdentity,
    MatrixLookAtLH,
    MatrixOrthographicLH,
    MatrixPerspectiveFovLH,
    MatrixPerspectiveLH,
    MatrixRotationAxis,
    MatrixRotationNormal,
    MatrixRotationRollPitchYaw,
    MatrixRotationX,
    MatrixRotationY,
    MatrixRotationZ,
    MatrixScaling,
    MatrixTranslation,
    ScalarCos,
    ScalarSin,
    VectorNormalize,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 17] = [
        Self::Pointer,
        Self::MatrixIdentity,
        Self::MatrixLookAtLH,
        Self::MatrixOrthographicLH,
        Self::MatrixPerspectiveFovLH,
        Self::MatrixPerspectiveLH,
        Self::MatrixRotationAxis,
        Self::MatrixRotationNormal,
        Self::MatrixRotationRollPitchYaw,
        Self::MatrixRotationX,
        Self::MatrixRotationY,
        Self::MatrixRotationZ,
        Self::MatrixScaling,
        Self::MatrixTranslation,
        Self::ScalarCos,
        Self::ScalarSin,
        Self::VectorNormalize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Pointer => "Pointer",
            Self::MatrixIdentity => "MatrixIdentity",
            Self::MatrixLookAtLH => "MatrixLookAtLH",
            Self::MatrixOrthographicLH => "MatrixOrthographicLH",
            Self::MatrixPerspectiveFovLH => "MatrixPerspectiveFovLH",
            Self::MatrixPerspectiveLH => "MatrixPerspectiveLH",
            Self::MatrixRotationAxis => "MatrixRotationAxis",
            Self::MatrixRotationNormal => "MatrixRotationNormal",
            Self::MatrixRotationRollPitchYaw => "MatrixRotationRollPitchYaw",
            Self::MatrixRotationX => "MatrixRotationX",
            Self::MatrixRotationY => "MatrixRotationY",
            Self::MatrixRotationZ => "MatrixRotationZ",
            Self::MatrixScaling => "MatrixScaling",
            Self::MatrixTranslation => "MatrixTranslation",
            Self::ScalarCos => "ScalarCos",
            Self::ScalarSin => "ScalarSin",
            Self::VectorNormalize => "VectorNormalize",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|function| function.name() == name)
    }

    /// Number of float arguments stored in the argument buffer
    ///
    /// `Pointer` stores a string instead and reports zero.
    pub fn argument_count(self) -> usize {
        match self {
            Self::Pointer | Self::MatrixIdentity => 0,
            Self::MatrixLookAtLH => 9,
            Self::MatrixOrthographicLH | Self::MatrixPerspectiveFovLH | Self::MatrixPerspectiveLH | Self::MatrixRotationAxis | Self::MatrixRotationNormal => 4,
            Self::MatrixRotationRollPitchYaw | Self::MatrixScaling | Self::MatrixTranslation => 3,
            Self::MatrixRotationX | Self::MatrixRotationY | Self::MatrixRotationZ | Self::ScalarCos | Self::ScalarSin => 1,
            Self::VectorNormalize => 4,
        }
    }

    /// Returns true if this function can produce a value of the given type
    pub fn can_return(self, value_type: ValueType) -> bool {
        match self {
            Self::Pointer => true,
            Self::ScalarCos | Self::ScalarSin => value_type == ValueType::Float1,
            Self::VectorNormalize => matches!(value_type, ValueType::Float2 | ValueType::Float3 | ValueType::Float4),
            _ => value_type == ValueType::Float4x4,
        }
    }
}

/// Where a variable's value comes from
///
/// System and function sources are mutually exclusive.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VariableSource {
    /// User-edited constant stored in the value grid
    #[default]
    Constant,
    System(SystemVariable),
    Function(FunctionKind),
}

/// Per-variable flag bitset
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VariableFlags(u8);

impl VariableFlags {
    /// Upload the inverse of the value (matrices)
    pub const INVERT: VariableFlags = VariableFlags(1);
    /// Upload the value from the previous frame
    pub const LAST_FRAME: VariableFlags = VariableFlags(2);

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn contains(self, other: VariableFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn set(&mut self, other: VariableFlags, enabled: bool) {
        if enabled {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

/// A named, typed shader input
///
/// Constant values live in a row-major 4x4 grid of 32-bit cells; cells beyond
/// the declared type's shape are ignored. Function-sourced variables keep their
/// arguments in a fixed-size byte buffer instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShaderVariable {
    pub name: String,
    pub value_type: ValueType,
    source: VariableSource,
    pub flags: VariableFlags,
    cells: [[u32; 4]; 4],
    #[serde(skip)]
    arguments: Vec<u8>,
}

impl ShaderVariable {
    /// Creates a zero-initialized constant variable
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            source: VariableSource::Constant,
            flags: VariableFlags::empty(),
            cells: [[0; 4]; 4],
            arguments: vec![0; ARGUMENT_BUFFER_SIZE],
        }
    }

    pub fn source(&self) -> VariableSource {
        self.source
    }

    /// Changes the value source
    ///
    /// Switching to a different function clears the argument buffer.
    pub fn set_source(&mut self, source: VariableSource) {
        if self.source != source {
            self.arguments.fill(0);
        }
        self.source = source;
    }

    pub fn system(&self) -> Option<SystemVariable> {
        match self.source {
            VariableSource::System(system) => Some(system),
            _ => None,
        }
    }

    pub fn function(&self) -> Option<FunctionKind> {
        match self.source {
            VariableSource::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn bool_value(&self, component: usize) -> bool {
        self.cells[0][component] != 0
    }

    pub fn set_bool(&mut self, component: usize, value: bool) {
        self.cells[0][component] = value as u32;
    }

    pub fn int_value(&self, component: usize) -> i32 {
        self.cells[0][component] as i32
    }

    pub fn set_int(&mut self, component: usize, value: i32) {
        self.cells[0][component] = value as u32;
    }

    pub fn float_value(&self, column: usize, row: usize) -> f32 {
        f32::from_bits(self.cells[row][column])
    }

    pub fn set_float(&mut self, column: usize, row: usize, value: f32) {
        self.cells[row][column] = value.to_bits();
    }

    /// Reads the n-th float argument of a function-sourced variable
    pub fn argument(&self, index: usize) -> f32 {
        let offset = index * size_of::<f32>();
        bytemuck::pod_read_unaligned(&self.arguments[offset..offset + size_of::<f32>()])
    }

    pub fn set_argument(&mut self, index: usize, value: f32) {
        let offset = index * size_of::<f32>();
        self.arguments[offset..offset + size_of::<f32>()].copy_from_slice(bytemuck::bytes_of(&value));
    }

    /// Name of the variable a `Pointer` function mirrors
    pub fn pointer_target(&self) -> &str {
        let end = self.arguments.iter().position(|&b| b == 0).unwrap_or(self.arguments.len());
        std::str::from_utf8(&self.arguments[..end]).unwrap_or_default()
    }

    /// Stores the pointer target, truncated to fit the argument buffer
    pub fn set_pointer_target(&mut self, target: &str) {
        self.arguments.fill(0);
        let mut len = target.len().min(ARGUMENT_BUFFER_SIZE - 1);
        while !target.is_char_boundary(len) {
            len -= 1;
        }
        self.arguments[..len].copy_from_slice(&target.as_bytes()[..len]);
    }

    /// Float arguments in storage order, for display
    pub fn arguments(&self) -> Vec<f32> {
        match self.function() {
            Some(function) => (0..function.argument_count()).map(|i| self.argument(i)).collect(),
            None => Vec::new(),
        }
    }
}

/// Ordered collection of the variables of one pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariableStore {
    variables: Vec<ShaderVariable>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variable; duplicate names are not rejected
    pub fn add(&mut self, variable: ShaderVariable) {
        self.variables.push(variable);
    }

    /// Adds a variable, replacing the first same-named one in place if present
    pub fn merge(&mut self, variable: ShaderVariable) {
        match self.variables.iter_mut().find(|v| v.name == variable.name) {
            Some(existing) => *existing = variable,
            None => self.variables.push(variable),
        }
    }

    /// Returns the first variable with the given name
    pub fn find(&self, name: &str) -> Option<&ShaderVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut ShaderVariable> {
        self.variables.iter_mut().find(|v| v.name == name)
    }

    /// All variables in insertion order
    pub fn all(&self) -> &[ShaderVariable] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
