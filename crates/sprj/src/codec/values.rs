//! Shader variable elements
//!
//! A variable is written as `<variable type name [invert] [lastframe]
//! [system|function]>` followed by its value rows. Constant booleans and
//! integers take one row of N values, floats take one row per matrix row, and
//! function-sourced variables store their arguments in a single row.

use super::xml::{attr, elements_named, push, set_attr, text, text_element};
use crate::fields::{parse_bool, parse_f32, parse_i32};
use crate::variables::{ARGUMENT_BUFFER_SIZE, FunctionKind, ShaderVariable, SystemVariable, ValueType, VariableFlags, VariableSource, VariableStore};
use xmltree::Element;

/// Reads one `<variable>` element
///
/// Unknown type names fall back to `float`. A system source whose native type
/// differs from the declared type is dropped, and a function source is dropped
/// if a system source is set or the function cannot return the declared type.
///
/// # Arguments
/// * `node` - The `<variable>` element
/// * `with_flags` - Read the `invert`/`lastframe` attributes (absent in old documents)
pub(crate) fn read_variable(node: &Element, with_flags: bool) -> ShaderVariable {
    let value_type = attr(node, "type").and_then(ValueType::from_name).unwrap_or_default();
    let name = attr(node, "name").unwrap_or_default();

    let system = attr(node, "system").and_then(SystemVariable::from_name).filter(|system| system.value_type() == value_type);
    let function = attr(node, "function")
        .and_then(FunctionKind::from_name)
        .filter(|function| system.is_none() && function.can_return(value_type));

    let mut variable = ShaderVariable::new(name, value_type);
    if with_flags {
        variable.flags.set(VariableFlags::INVERT, attr(node, "invert").is_some_and(parse_bool));
        variable.flags.set(VariableFlags::LAST_FRAME, attr(node, "lastframe").is_some_and(parse_bool));
    }

    match (system, function) {
        (Some(system), _) => variable.set_source(VariableSource::System(system)),
        (None, Some(function)) => {
            variable.set_source(VariableSource::Function(function));
            read_value_rows(node, &mut variable);
        }
        (None, None) => read_value_rows(node, &mut variable),
    }

    variable
}

/// Reads the `<row><value>` grid under `node` into a variable's storage
///
/// Values beyond the variable's storage are ignored.
pub(crate) fn read_value_rows(node: &Element, variable: &mut ShaderVariable) {
    let max_arguments = ARGUMENT_BUFFER_SIZE / size_of::<f32>();

    for (row, row_node) in elements_named(node, "row").enumerate() {
        for (column, value_node) in elements_named(row_node, "value").enumerate() {
            let value = text(value_node);
            match variable.source() {
                VariableSource::Function(FunctionKind::Pointer) => variable.set_pointer_target(&value),
                VariableSource::Function(_) => {
                    if column < max_arguments {
                        variable.set_argument(column, parse_f32(&value));
                    }
                }
                VariableSource::System(_) => {}
                VariableSource::Constant => {
                    if column >= 4 {
                        continue;
                    }
                    let value_type = variable.value_type;
                    if value_type.is_bool() {
                        variable.set_bool(column, parse_bool(&value));
                    } else if value_type.is_int() {
                        variable.set_int(column, parse_i32(&value));
                    } else if row < 4 {
                        variable.set_float(column, row, parse_f32(&value));
                    }
                }
            }
        }
    }
}

/// Appends the value rows of a variable to `node`
pub(crate) fn write_value_rows(node: &mut Element, variable: &ShaderVariable) {
    let value_type = variable.value_type;
    match variable.source() {
        VariableSource::System(_) => {}
        VariableSource::Function(FunctionKind::Pointer) => {
            let mut row = Element::new("row");
            push(&mut row, text_element("value", variable.pointer_target()));
            push(node, row);
        }
        VariableSource::Function(_) => {
            let mut row = Element::new("row");
            for argument in variable.arguments() {
                push(&mut row, text_element("value", argument));
            }
            push(node, row);
        }
        VariableSource::Constant => {
            for row_index in 0..value_type.rows() {
                let mut row = Element::new("row");
                for column in 0..value_type.columns() {
                    let value = if value_type.is_bool() {
                        variable.bool_value(column).to_string()
                    } else if value_type.is_int() {
                        variable.int_value(column).to_string()
                    } else {
                        variable.float_value(column, row_index).to_string()
                    };
                    push(&mut row, text_element("value", value));
                }
                push(node, row);
            }
        }
    }
}

fn write_variable(variable: &ShaderVariable) -> Element {
    let mut node = Element::new("variable");
    set_attr(&mut node, "type", variable.value_type);
    set_attr(&mut node, "name", &variable.name);
    if variable.flags.contains(VariableFlags::INVERT) {
        set_attr(&mut node, "invert", true);
    }
    if variable.flags.contains(VariableFlags::LAST_FRAME) {
        set_attr(&mut node, "lastframe", true);
    }
    match variable.source() {
        VariableSource::System(system) => set_attr(&mut node, "system", system.name()),
        VariableSource::Function(function) => set_attr(&mut node, "function", function.name()),
        VariableSource::Constant => {}
    }
    write_value_rows(&mut node, variable);
    node
}

/// Appends a `<variables>` section to `pass`; nothing is written for an empty store
pub(crate) fn write_variables(pass: &mut Element, variables: &VariableStore) {
    if variables.is_empty() {
        return;
    }

    let mut section = Element::new("variables");
    for variable in variables.all() {
        push(&mut section, write_variable(variable));
    }
    push(pass, section);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Element {
        Element::parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_read_constant_vector() {
        let node = parse(r#"<variable type="float4" name="Color"><row><value>1</value><value>0.5</value><value>0.25</value><value>1</value></row></variable>"#);
        let variable = read_variable(&node, true);
        assert_eq!(variable.name, "Color");
        assert_eq!(variable.value_type, ValueType::Float4);
        assert_eq!(variable.float_value(1, 0), 0.5);
        assert_eq!(variable.float_value(2, 0), 0.25);
    }

    #[test]
    fn test_read_matrix_rows() {
        let node = parse(
            r#"<variable type="float2x2" name="M">
                <row><value>1</value><value>2</value></row>
                <row><value>3</value><value>4</value></row>
            </variable>"#,
        );
        let variable = read_variable(&node, true);
        assert_eq!(variable.float_value(0, 1), 3.0);
        assert_eq!(variable.float_value(1, 1), 4.0);
    }

    #[test]
    fn test_system_type_mismatch_is_dropped() {
        let matched = read_variable(&parse(r#"<variable type="float" name="t" system="Time"/>"#), true);
        assert_eq!(matched.system(), Some(SystemVariable::Time));

        let mismatched = read_variable(&parse(r#"<variable type="float4" name="t" system="Time"/>"#), true);
        assert_eq!(mismatched.source(), VariableSource::Constant);
    }

    #[test]
    fn test_function_validation() {
        let node = parse(r#"<variable type="float4x4" name="World" function="MatrixTranslation"><row><value>1</value><value>2</value><value>3</value></row></variable>"#);
        let variable = read_variable(&node, true);
        assert_eq!(variable.function(), Some(FunctionKind::MatrixTranslation));
        assert_eq!(variable.arguments(), vec![1.0, 2.0, 3.0]);

        let wrong_type = read_variable(&parse(r#"<variable type="float2" name="x" function="MatrixTranslation"/>"#), true);
        assert_eq!(wrong_type.function(), None);

        let with_system = read_variable(&parse(r#"<variable type="float" name="x" system="Time" function="ScalarSin"/>"#), true);
        assert_eq!(with_system.function(), None);
        assert_eq!(with_system.system(), Some(SystemVariable::Time));
    }

    #[test]
    fn test_unknown_type_and_flags() {
        let node = parse(r#"<variable type="double" name="x" invert="true" lastframe="true"/>"#);
        assert_eq!(read_variable(&node, true).value_type, ValueType::Float1);
        assert!(read_variable(&node, true).flags.contains(VariableFlags::INVERT));
        assert!(!read_variable(&node, false).flags.contains(VariableFlags::LAST_FRAME));
    }

    #[test]
    fn test_write_rows_match_shape() {
        let mut flags = ShaderVariable::new("Flags", ValueType::Bool3);
        flags.set_bool(1, true);
        let mut node = Element::new("variable");
        write_value_rows(&mut node, &flags);
        let rows: Vec<_> = elements_named(&node, "row").collect();
        assert_eq!(rows.len(), 1);
        let values: Vec<_> = elements_named(rows[0], "value").map(text).collect();
        assert_eq!(values, vec!["false", "true", "false"]);

        let matrix = ShaderVariable::new("M", ValueType::Float3x3);
        let mut node = Element::new("variable");
        write_value_rows(&mut node, &matrix);
        assert_eq!(elements_named(&node, "row").count(), 3);
        assert!(elements_named(&node, "row").all(|row| elements_named(row, "value").count() == 3));
    }

    #[test]
    fn test_pointer_round_trip() {
        let mut variable = ShaderVariable::new("Mirror", ValueType::Float4);
        variable.set_source(VariableSource::Function(FunctionKind::Pointer));
        variable.set_pointer_target("Color");

        let node = write_variable(&variable);
        assert_eq!(attr(&node, "function"), Some("Pointer"));
        assert_eq!(read_variable(&node, true), variable);
    }

    #[test]
    fn test_system_variable_has_no_rows() {
        let mut variable = ShaderVariable::new("Time", ValueType::Float1);
        variable.set_source(VariableSource::System(SystemVariable::Time));
        let node = write_variable(&variable);
        assert_eq!(attr(&node, "system"), Some("Time"));
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_empty_store_writes_nothing() {
        let mut pass = Element::new("pass");
        write_variables(&mut pass, &VariableStore::new());
        assert!(pass.children.is_empty());
    }
}
