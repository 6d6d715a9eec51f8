//! Small helpers over `xmltree` elements

use std::fmt::Display;
use xmltree::{Element, XMLNode};

/// Child elements of `parent` in document order
pub(crate) fn elements(parent: &Element) -> impl Iterator<Item = &Element> {
    parent.children.iter().filter_map(XMLNode::as_element)
}

/// Child elements of `parent` with the given name
pub(crate) fn elements_named<'a>(parent: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> {
    elements(parent).filter(move |element| element.name == name)
}

/// Children named `name` inside the first `section_name` child; empty if that child is absent
pub(crate) fn section<'a>(parent: &'a Element, section_name: &str, name: &'a str) -> impl Iterator<Item = &'a Element> {
    parent.get_child(section_name).into_iter().flat_map(move |found| elements_named(found, name))
}

pub(crate) fn attr<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element.attributes.get(name).map(String::as_str)
}

/// Trimmed text content; empty if the element has none
pub(crate) fn text(element: &Element) -> String {
    element.get_text().map(|text| text.trim().to_string()).unwrap_or_default()
}

pub(crate) fn child_text(element: &Element, name: &str) -> Option<String> {
    element.get_child(name).map(text)
}

pub(crate) fn set_attr(element: &mut Element, name: &str, value: impl Display) {
    element.attributes.insert(name.to_string(), value.to_string());
}

/// Builds `<name>text</name>`
pub(crate) fn text_element(name: &str, value: impl Display) -> Element {
    let mut element = Element::new(name);
    let value = value.to_string();
    if !value.is_empty() {
        element.children.push(XMLNode::Text(value));
    }
    element
}

pub(crate) fn push(parent: &mut Element, child: Element) {
    parent.children.push(XMLNode::Element(child));
}
