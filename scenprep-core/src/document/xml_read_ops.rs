use std::str::FromStr;

use roxmltree::{Document, Node, ParsingOptions};

use crate::{time::ClockTime, DocumentError};

/// parses a document, accepting the `<!DOCTYPE ...>` declaration that
/// simulation input files carry.
pub fn parse_document(xml: &str) -> Result<Document<'_>, DocumentError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Ok(Document::parse_with_options(xml, options)?)
}

/// reads an attribute that must be present on the element.
pub fn required_attr<'a>(node: &Node<'a, '_>, name: &str) -> Result<&'a str, DocumentError> {
    node.attribute(name).ok_or_else(|| {
        let pos = node.document().text_pos_at(node.range().start);
        DocumentError::SchemaMismatch(format!(
            "<{}> at {pos} is missing required attribute '{name}'",
            node.tag_name().name()
        ))
    })
}

/// parses an optional attribute into a number type.
pub fn parse_attr<T: FromStr>(node: &Node, name: &str) -> Result<Option<T>, DocumentError> {
    match node.attribute(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| DocumentError::InvalidNumber {
                field: format!("{}@{name}", node.tag_name().name()),
                value: value.to_string(),
            }),
    }
}

/// parses an attribute that must be present into a number type.
pub fn parse_required_attr<T: FromStr>(node: &Node, name: &str) -> Result<T, DocumentError> {
    let value = required_attr(node, name)?;
    value
        .trim()
        .parse::<T>()
        .map_err(|_| DocumentError::InvalidNumber {
            field: format!("{}@{name}", node.tag_name().name()),
            value: value.to_string(),
        })
}

pub fn parse_time_attr(node: &Node, name: &str) -> Result<Option<ClockTime>, DocumentError> {
    node.attribute(name).map(ClockTime::from_str).transpose()
}

/// direct element children with the given local name
pub fn children<'a, 'input: 'a>(
    node: &Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// first direct element child with the given local name
pub fn child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// element descendants (including nested ones) with the given local name
pub fn descendants<'a, 'input: 'a>(
    node: &Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// trimmed text content of an element, None when empty.
pub fn text(node: &Node) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

/// fails unless the document root element has the expected local name.
pub fn expect_root<'a, 'input>(
    doc: &'a Document<'input>,
    name: &str,
) -> Result<Node<'a, 'input>, DocumentError> {
    let root = doc.root_element();
    if root.tag_name().name() != name {
        return Err(DocumentError::SchemaMismatch(format!(
            "expected root element <{name}>, found <{}>",
            root.tag_name().name()
        )));
    }
    Ok(root)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_document_with_doctype() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE population SYSTEM "http://www.matsim.org/files/dtd/population_v6.dtd">
<population/>"#;
        let doc = parse_document(xml).expect("doctype accepted");
        assert!(expect_root(&doc, "population").is_ok());
        assert!(Document::parse(xml).is_err());
    }
}
