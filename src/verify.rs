//! Read a produced archive back and check its container structure.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use zip::{CompressionMethod, ZipArchive};

use crate::archive::{EPUB_MIMETYPE, MIMETYPE_PATH};
use crate::documents::CONTAINER_PATH;
use crate::error::{BuildError, Result};

/// One entry of the archive, in central-directory order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub stored: bool,
    pub size: u64,
    pub compressed_size: u64,
}

/// What [`inspect`] found inside an archive.
#[derive(Debug, Clone, Default)]
pub struct ContainerReport {
    pub entries: Vec<EntryInfo>,
    /// Bytes of the first entry, when it is named `mimetype`.
    pub mimetype: Option<Vec<u8>>,
    /// Package document path from `container.xml`.
    pub rootfile: Option<String>,
    /// Manifest hrefs resolved against the package document's directory.
    pub manifest_paths: Vec<String>,
}

impl ContainerReport {
    /// Structural problems, empty when the container is sound.
    pub fn check(&self) -> Vec<String> {
        let mut problems = Vec::new();

        match self.entries.first() {
            Some(first) if first.name == MIMETYPE_PATH => {
                if !first.stored {
                    problems.push("mimetype entry is compressed".to_string());
                }
            }
            Some(first) => problems.push(format!(
                "first entry is '{}', expected 'mimetype'",
                first.name
            )),
            None => problems.push("archive is empty".to_string()),
        }
        if let Some(ref content) = self.mimetype
            && content.as_slice() != EPUB_MIMETYPE
        {
            problems.push(format!(
                "mimetype content is {:?}",
                String::from_utf8_lossy(content)
            ));
        }

        if !self.contains(CONTAINER_PATH) {
            problems.push(format!("missing {CONTAINER_PATH}"));
        }
        match self.rootfile {
            Some(ref rootfile) if !self.contains(rootfile) => {
                problems.push(format!("package document {rootfile} not in archive"));
            }
            None if self.contains(CONTAINER_PATH) => {
                problems.push("container.xml names no rootfile".to_string());
            }
            _ => {}
        }
        for path in &self.manifest_paths {
            if !self.contains(path) {
                problems.push(format!("manifest href {path} not in archive"));
            }
        }

        problems
    }

    pub fn is_valid(&self) -> bool {
        self.check().is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }
}

/// Open an EPUB on disk and describe its container.
pub fn inspect(path: impl AsRef<Path>) -> Result<ContainerReport> {
    let file = File::open(path.as_ref())?;
    inspect_reader(BufReader::new(file))
}

/// Describe the container of an EPUB from any `Read + Seek` source.
pub fn inspect_reader<R: Read + Seek>(reader: R) -> Result<ContainerReport> {
    let mut archive = ZipArchive::new(reader)?;
    let mut report = ContainerReport::default();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let info = EntryInfo {
            name: file.name().to_string(),
            stored: file.compression() == CompressionMethod::Stored,
            size: file.size(),
            compressed_size: file.compressed_size(),
        };
        if i == 0 && info.name == MIMETYPE_PATH {
            let mut content = Vec::new();
            file.read_to_end(&mut content)?;
            report.mimetype = Some(content);
        }
        report.entries.push(info);
    }

    if report.contains(CONTAINER_PATH) {
        let container = read_entry(&mut archive, CONTAINER_PATH)?;
        report.rootfile = rootfile_path(&container)?;
    }

    if let Some(rootfile) = report.rootfile.clone()
        && report.contains(&rootfile)
    {
        let opf = read_entry(&mut archive, &rootfile)?;
        let base = rootfile.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        report.manifest_paths = manifest_hrefs(&opf)?
            .into_iter()
            .map(|href| {
                if base.is_empty() {
                    href
                } else {
                    format!("{base}/{href}")
                }
            })
            .collect();
    }

    Ok(report)
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = archive.by_name(name)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

fn rootfile_path(container: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(container);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"rootfile" => {
                return attribute(&e, b"full-path");
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(xml_error(CONTAINER_PATH, e)),
            _ => {}
        }
    }
}

fn manifest_hrefs(opf: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(opf);
    reader.config_mut().trim_text(true);
    let mut hrefs = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.local_name().as_ref() == b"item" => {
                if let Some(href) = attribute(&e, b"href")? {
                    hrefs.push(href);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("package document", e)),
            _ => {}
        }
    }
    Ok(hrefs)
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr =
            attr.map_err(|err| BuildError::InvalidPackage(format!("bad attribute: {err}")))?;
        if attr.key.as_ref() == key {
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw)
                .map_err(|err| BuildError::InvalidPackage(format!("bad attribute value: {err}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn xml_error(what: &str, err: quick_xml::Error) -> BuildError {
    BuildError::InvalidPackage(format!("malformed {what}: {err}"))
}
