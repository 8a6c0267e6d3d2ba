//! Document loading: turns one XML file into a plain list of [`Record`]s.
//!
//! The matcher and schema discovery only ever see [`Record`]s, never the XML
//! event stream, so any [`DocumentParser`] implementation can stand in for
//! [`XmlDocumentParser`].
use memmap2::Mmap;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::path::Path;
use tracing::trace;

use crate::config::ScanConfig;
use crate::errors::{ScanError, ScanResult};

pub(crate) const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB
const EVENT_BUFFER_CAPACITY: usize = 1024;

/// One record inside a document: field names mapped to text values, in
/// document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field. A repeated field name keeps its first value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if self.get(&name).is_none() {
            self.fields.push((name, value.into()));
        }
    }

    /// Value of the named field, if the record has it
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Fields as `(name, value)` pairs in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// Loads the records of one document
pub trait DocumentParser: Send + Sync {
    fn parse(&self, path: &Path) -> ScanResult<Vec<Record>>;
}

/// Parses `<root><record><field>value</field>...</record>...</root>` documents
#[derive(Debug, Clone)]
pub struct XmlDocumentParser {
    root_element: String,
    record_element: String,
}

impl Default for XmlDocumentParser {
    fn default() -> Self {
        Self::new("stockItem", "item")
    }
}

impl XmlDocumentParser {
    pub fn new(root_element: impl Into<String>, record_element: impl Into<String>) -> Self {
        Self {
            root_element: root_element.into(),
            record_element: record_element.into(),
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(&config.root_element, &config.record_element)
    }

    /// Parses an in-memory document. `path` is only used for error reporting.
    pub fn parse_bytes(&self, bytes: &[u8], path: &Path) -> ScanResult<Vec<Record>> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::with_capacity(EVENT_BUFFER_CAPACITY);

        let mut records = Vec::new();
        let mut depth = 0usize;
        let mut saw_root = false;
        let mut current: Option<Record> = None;
        let mut field: Option<(String, String)> = None;

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                ScanError::parse(
                    path,
                    format!("error at position {}: {}", reader.buffer_position(), e),
                )
            })?;

            match event {
                Event::Start(ref e) => {
                    let name = element_name(e.name().as_ref(), path)?;
                    match depth {
                        0 => {
                            self.check_root(&name, path)?;
                            saw_root = true;
                        }
                        1 if name == self.record_element => current = Some(Record::new()),
                        2 if current.is_some() => field = Some((name, String::new())),
                        _ => {}
                    }
                    depth += 1;
                }
                Event::Empty(ref e) => {
                    let name = element_name(e.name().as_ref(), path)?;
                    match depth {
                        0 => {
                            self.check_root(&name, path)?;
                            saw_root = true;
                        }
                        1 if name == self.record_element => records.push(Record::new()),
                        2 => {
                            if let Some(record) = current.as_mut() {
                                record.insert(name, String::new());
                            }
                        }
                        _ => {}
                    }
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    match depth {
                        2 => {
                            if let (Some(record), Some((name, value))) =
                                (current.as_mut(), field.take())
                            {
                                record.insert(name, value);
                            }
                        }
                        1 => {
                            if let Some(record) = current.take() {
                                records.push(record);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Text(ref e) if depth == 3 => {
                    if let Some((_, value)) = field.as_mut() {
                        let text = e
                            .unescape()
                            .map_err(|err| ScanError::parse(path, err.to_string()))?;
                        value.push_str(&text);
                    }
                }
                Event::CData(ref e) if depth == 3 => {
                    if let Some((_, value)) = field.as_mut() {
                        value.push_str(&String::from_utf8_lossy(e));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !saw_root {
            return Err(ScanError::missing_root(path, &self.root_element));
        }
        if depth != 0 {
            return Err(ScanError::parse(path, "unexpected end of document"));
        }

        trace!("Parsed {} records from {}", records.len(), path.display());
        Ok(records)
    }

    fn check_root(&self, name: &str, path: &Path) -> ScanResult<()> {
        if name == self.root_element {
            Ok(())
        } else {
            Err(ScanError::missing_root(path, &self.root_element))
        }
    }
}

impl DocumentParser for XmlDocumentParser {
    fn parse(&self, path: &Path) -> ScanResult<Vec<Record>> {
        let file = File::open(path).map_err(|e| ScanError::parse(path, e.to_string()))?;
        let size = file
            .metadata()
            .map_err(|e| ScanError::parse(path, e.to_string()))?
            .len();

        if size >= LARGE_FILE_THRESHOLD {
            trace!("Memory mapping large document: {}", path.display());
            let mmap =
                unsafe { Mmap::map(&file) }.map_err(|e| ScanError::parse(path, e.to_string()))?;
            self.parse_bytes(&mmap, path)
        } else {
            let bytes = std::fs::read(path).map_err(|e| ScanError::parse(path, e.to_string()))?;
            self.parse_bytes(&bytes, path)
        }
    }
}

fn element_name(raw: &[u8], path: &Path) -> ScanResult<String> {
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|e| ScanError::parse(path, format!("invalid element name: {}", e)))
}
