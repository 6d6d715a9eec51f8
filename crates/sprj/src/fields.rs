//! Field tables shared by the document reader and writer
//!
//! Records whose document form is "one child element per field, omitted when
//! equal to the default" describe their fields once in a `Field` table. The
//! writer compares each field against `Default::default()` and the reader starts
//! from the default and applies whatever children are present, so both
//! directions always agree on names and defaults.

/// One named field of a record
pub struct Field<T> {
    /// Element name in the project document
    pub name: &'static str,
    /// Formats the field's current value
    pub get: fn(&T) -> String,
    /// Parses document text into the field (lenient, never fails)
    pub set: fn(&mut T, &str),
}

/// A record described by a field table
pub trait FieldTable: Default + Sized + 'static {
    /// All fields in document order
    fn fields() -> &'static [Field<Self>];

    /// Fields whose value differs from the default, as (name, text) pairs
    fn changed_fields(&self) -> Vec<(&'static str, String)> {
        let default = Self::default();
        Self::fields()
            .iter()
            .filter_map(|field| {
                let value = (field.get)(self);
                (value != (field.get)(&default)).then_some((field.name, value))
            })
            .collect()
    }

    /// Applies a document child to the matching field
    ///
    /// # Returns
    /// `true` if a field with this name exists
    fn apply_field(&mut self, name: &str, text: &str) -> bool {
        match Self::fields().iter().find(|field| field.name == name) {
            Some(field) => {
                (field.set)(self, text);
                true
            }
            None => false,
        }
    }
}

/// Parses a boolean the way project documents spell them
///
/// Anything starting with `1`, `t`, `T`, `y` or `Y` is true.
pub fn parse_bool(text: &str) -> bool {
    matches!(text.trim_start().chars().next(), Some('1' | 't' | 'T' | 'y' | 'Y'))
}

/// Parses a float, yielding 0 on malformed input
pub fn parse_f32(text: &str) -> f32 {
    text.trim().parse().unwrap_or(0.0)
}

/// Parses a signed integer, yielding 0 on malformed input
pub fn parse_i32(text: &str) -> i32 {
    let text = text.trim();
    text.parse().or_else(|_| text.parse::<f64>().map(|v| v as i32)).unwrap_or(0)
}

/// Parses an unsigned integer, yielding 0 on malformed or negative input
///
/// Fractional input is truncated.
pub fn parse_u32(text: &str) -> u32 {
    let text = text.trim();
    text.parse().or_else(|_| text.parse::<f64>().map(|v| v as u32)).unwrap_or(0)
}

/// Declares a closed enum whose variants have fixed document names
///
/// Generates `ALL`, `name()`, `from_name()` and `Display`.
macro_rules! named_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in document name table order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name used in project documents
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Looks up a variant by its document name
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.name() == name)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

pub(crate) use named_enum;
