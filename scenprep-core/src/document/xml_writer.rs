use std::{io::Write, path::Path};

use crate::{
    util::fs::{self, OutputFile},
    DocumentError,
};

/// opens `path`, lets `write` emit the document and completes the file.
pub fn write_document<P, F>(path: P, write: F) -> Result<(), DocumentError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut XmlWriter<OutputFile>) -> std::io::Result<()>,
{
    let path = path.as_ref();
    let mut writer = XmlWriter::new(fs::create_output(path)?);
    write(&mut writer)
        .and_then(|_| writer.into_inner().finish())
        .map_err(|e| DocumentError::WriteError {
            path: path.to_owned(),
            message: e.to_string(),
        })
}

/// minimal streaming XML writer that indents nested elements and escapes
/// attribute values and text content.
pub struct XmlWriter<W: Write> {
    out: W,
    depth: usize,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> XmlWriter<W> {
        XmlWriter { out, depth: 0 }
    }

    pub fn declaration(&mut self) -> std::io::Result<()> {
        writeln!(self.out, r#"<?xml version="1.0" encoding="utf-8"?>"#)
    }

    pub fn doctype(&mut self, root: &str, system_id: &str) -> std::io::Result<()> {
        writeln!(self.out, r#"<!DOCTYPE {root} SYSTEM "{system_id}">"#)
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, String)]) -> std::io::Result<()> {
        self.open_tag(name, attrs)?;
        writeln!(self.out, ">")?;
        self.depth += 1;
        Ok(())
    }

    pub fn end(&mut self, name: &str) -> std::io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.indent()?;
        writeln!(self.out, "</{name}>")
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, String)]) -> std::io::Result<()> {
        self.open_tag(name, attrs)?;
        writeln!(self.out, "/>")
    }

    pub fn text_element(
        &mut self,
        name: &str,
        attrs: &[(&str, String)],
        text: &str,
    ) -> std::io::Result<()> {
        self.open_tag(name, attrs)?;
        writeln!(self.out, ">{}</{name}>", escape(text))
    }

    /// writes an already serialized element on its own line.
    pub fn raw(&mut self, fragment: &str) -> std::io::Result<()> {
        self.indent()?;
        writeln!(self.out, "{}", fragment.trim())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn open_tag(&mut self, name: &str, attrs: &[(&str, String)]) -> std::io::Result<()> {
        self.indent()?;
        write!(self.out, "<{name}")?;
        for (key, value) in attrs {
            write!(self.out, r#" {key}="{}""#, escape(value))?;
        }
        Ok(())
    }

    fn indent(&mut self) -> std::io::Result<()> {
        for _ in 0..self.depth {
            write!(self.out, "\t")?;
        }
        Ok(())
    }
}

/// escapes the five XML special characters.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod test {
    use super::*;

    fn write_sample(writer: &mut XmlWriter<Vec<u8>>) -> std::io::Result<()> {
        writer.start("transitSchedule", &[])?;
        writer.empty("stopFacility", &[("id", String::from("a&b"))])?;
        writer.text_element("transportMode", &[], "train")?;
        writer.end("transitSchedule")
    }

    #[test]
    fn test_nested_output() {
        let mut writer = XmlWriter::new(Vec::new());
        write_sample(&mut writer).expect("write to vec");
        let text = String::from_utf8(writer.into_inner()).expect("utf8");
        assert_eq!(
            text,
            "<transitSchedule>\n\t<stopFacility id=\"a&amp;b\"/>\n\t<transportMode>train</transportMode>\n</transitSchedule>\n"
        );
    }

    #[test]
    fn test_escape_unicode_untouched() {
        assert_eq!(escape("叡山 <x>"), "叡山 &lt;x&gt;");
    }
}
