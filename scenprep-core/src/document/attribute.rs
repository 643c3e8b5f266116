use std::io::Write;

use roxmltree::Node;
use serde::{Deserialize, Serialize};

use super::{xml_read_ops, XmlWriter};
use crate::DocumentError;

/// a typed value in an `<attributes>` block. `class` names the value type
/// expected by the simulation toolkit, e.g. `java.lang.String`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub class: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: &str, class: &str, value: impl ToString) -> Attribute {
        Attribute {
            name: name.to_string(),
            class: class.to_string(),
            value: value.to_string(),
        }
    }

    pub fn string(name: &str, value: impl ToString) -> Attribute {
        Attribute::new(name, JAVA_STRING, value)
    }

    /// doubles always carry a fractional part, e.g. `2.0`
    pub fn double(name: &str, value: f64) -> Attribute {
        Attribute::new(name, JAVA_DOUBLE, format!("{value:?}"))
    }
}

pub const JAVA_STRING: &str = "java.lang.String";
pub const JAVA_DOUBLE: &str = "java.lang.Double";
pub const JAVA_INTEGER: &str = "java.lang.Integer";
pub const JAVA_LONG: &str = "java.lang.Long";
pub const JAVA_BOOLEAN: &str = "java.lang.Boolean";

/// ordered attribute collection. names are unique: [`AttributeBag::set`]
/// replaces an existing entry in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeBag(pub Vec<Attribute>);

impl AttributeBag {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.0.iter().find(|a| a.name == name)
    }

    pub fn set(&mut self, attribute: Attribute) {
        match self.0.iter_mut().find(|a| a.name == attribute.name) {
            Some(existing) => *existing = attribute,
            None => self.0.push(attribute),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.0.iter()
    }

    /// reads the `<attributes>` child of `parent`, if present.
    pub fn from_parent(parent: &Node) -> Result<AttributeBag, DocumentError> {
        let block = match xml_read_ops::child(parent, "attributes") {
            Some(block) => block,
            None => return Ok(AttributeBag::default()),
        };
        let attributes = xml_read_ops::children(&block, "attribute")
            .map(|node| {
                Ok(Attribute {
                    name: xml_read_ops::required_attr(&node, "name")?.to_string(),
                    class: xml_read_ops::required_attr(&node, "class")?.to_string(),
                    value: node.text().unwrap_or_default().to_string(),
                })
            })
            .collect::<Result<Vec<_>, DocumentError>>()?;
        Ok(AttributeBag(attributes))
    }

    /// writes an `<attributes>` block. nothing is written for an empty bag.
    pub fn write<W: Write>(&self, writer: &mut XmlWriter<W>) -> std::io::Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        writer.start("attributes", &[])?;
        for attribute in self.iter() {
            writer.text_element(
                "attribute",
                &[
                    ("name", attribute.name.clone()),
                    ("class", attribute.class.clone()),
                ],
                &attribute.value,
            )?;
        }
        writer.end("attributes")
    }
}

impl FromIterator<Attribute> for AttributeBag {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        let mut bag = AttributeBag::default();
        for attribute in iter {
            bag.set(attribute);
        }
        bag
    }
}
