use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};

use crate::DocumentError;

/// true if the path names a gzip-compressed file by extension.
pub fn is_gzip<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// reads a whole text file into memory, transparently decompressing `.gz` files.
pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String, DocumentError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| DocumentError::ReadError {
        path: path.to_owned(),
        message: e.to_string(),
    })?;
    let mut contents = String::new();
    let result = if is_gzip(path) {
        GzDecoder::new(BufReader::new(file)).read_to_string(&mut contents)
    } else {
        BufReader::new(file).read_to_string(&mut contents)
    };
    result.map_err(|e| DocumentError::ReadError {
        path: path.to_owned(),
        message: e.to_string(),
    })?;
    Ok(contents)
}

/// helper function to "mkdir -p path" - make all directories along a path
pub fn create_dirs<P>(path: P) -> Result<(), DocumentError>
where
    P: AsRef<Path>,
{
    let dirspath = path.as_ref();
    if dirspath.as_os_str().is_empty() || dirspath.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dirspath).map_err(|e| DocumentError::WriteError {
        path: dirspath.to_owned(),
        message: format!("error building output directory: {e}"),
    })
}

/// a document output file. gzip output only becomes complete once
/// [`OutputFile::finish`] writes the trailer.
pub enum OutputFile {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputFile {
    /// flushes all buffered output, completing the gzip stream if any.
    pub fn finish(self) -> std::io::Result<()> {
        match self {
            OutputFile::Plain(mut out) => out.flush(),
            OutputFile::Gzip(out) => out.finish()?.flush(),
        }
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            OutputFile::Plain(out) => out.write(buf),
            OutputFile::Gzip(out) => out.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            OutputFile::Plain(out) => out.flush(),
            OutputFile::Gzip(out) => out.flush(),
        }
    }
}

/// opens an output file for writing, creating parent directories as needed.
/// files ending in `.gz` are gzip-compressed.
pub fn create_output<P: AsRef<Path>>(path: P) -> Result<OutputFile, DocumentError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        create_dirs(parent)?;
    }
    let file = File::create(path).map_err(|e| DocumentError::WriteError {
        path: path.to_owned(),
        message: e.to_string(),
    })?;
    let out = BufWriter::new(file);
    if is_gzip(path) {
        Ok(OutputFile::Gzip(GzEncoder::new(out, Compression::default())))
    } else {
        Ok(OutputFile::Plain(out))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_gzip_round_trip() {
        let dir = std::env::temp_dir().join("scenprep-core-fs-test");
        let path = dir.join("nested").join("contents.txt.gz");
        let mut out = create_output(&path).expect("open output");
        out.write_all(b"<population/>").expect("write");
        out.finish().expect("finish");
        let text = read_to_string(&path).expect("read back");
        assert_eq!(text, "<population/>");
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_finished_gzip_has_trailer() {
        let dir = std::env::temp_dir().join("scenprep-core-fs-trailer-test");
        let path = dir.join("contents.xml.gz");
        let mut out = create_output(&path).expect("open output");
        out.write_all(b"<vehicleDefinitions/>").expect("write");
        out.finish().expect("finish");
        let bytes = std::fs::read(&path).expect("read bytes");
        // gzip member: 10 byte header, deflate data, crc32 and size trailer
        let size = bytes[bytes.len() - 4..]
            .iter()
            .rev()
            .fold(0u32, |acc, b| (acc << 8) | *b as u32);
        assert_eq!(size as usize, b"<vehicleDefinitions/>".len());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = read_to_string("/definitely/not/here.xml");
        assert!(matches!(result, Err(DocumentError::ReadError { .. })));
    }
}
