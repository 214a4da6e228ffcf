//! Shared fixtures for the engine-backed tests
//!
//! Engine-backed tests need a LibreOffice installation and are ignored by
//! default. Run them with `LOK_PATH=<program dir> cargo test -- --ignored`.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use officekit_server::config::DEFAULT_INSTALL_PATH;
use officekit_server::office::Office;
use tempfile::TempDir;
use zip::{write::SimpleFileOptions, ZipWriter};

pub const PLAIN_TEXT: &str = "text/plain;charset=utf-8";

const PARAGRAPH: &str = "The quick brown fox jumps over the lazy dog while the \
    engine lays out this paragraph across the first page of the sample document.";

/// Installation directory under test
pub fn install_path() -> PathBuf {
    std::env::var_os("LOK_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INSTALL_PATH))
}

/// Office handle on the installed engine. Panics when there is none, so a
/// missing installation fails the test instead of passing it.
pub fn office() -> Office {
    let dir = install_path();
    Office::new(&dir).unwrap_or_else(|e| {
        panic!(
            "no usable LibreOffice engine under {} (set LOK_PATH): {}",
            dir.display(),
            e
        )
    })
}

/// A two-page Word document; the first page holds well over 1000
/// characters of text.
pub fn sample_docx() -> Vec<u8> {
    let mut body = String::new();
    for _ in 0..12 {
        body.push_str(&format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", PARAGRAPH));
    }
    body.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
    body.push_str("<w:p><w:r><w:t>Second page.</w:t></w:r></w:p>");

    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
        body
    );

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#).unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#).unwrap();

        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(document.as_bytes()).unwrap();

        zip.finish().unwrap();
    }
    buffer
}

/// Write the sample document into `dir` and return its path
pub fn write_sample(dir: &Path) -> PathBuf {
    let path = dir.join("sample.docx");
    std::fs::write(&path, sample_docx()).unwrap();
    path
}

pub fn sample_dir() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path());
    (dir, path)
}
