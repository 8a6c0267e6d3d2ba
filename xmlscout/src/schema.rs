use std::path::Path;
use tracing::debug;

use crate::document::{DocumentParser, Record};
use crate::errors::{ScanError, ScanResult};

/// Collects the field names used across `records`, deduplicated, in the order
/// they are first seen
pub fn discover_fields(records: &[Record]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for name in records.iter().flat_map(Record::field_names) {
        if !fields.iter().any(|known| known == name) {
            fields.push(name.to_string());
        }
    }
    fields
}

/// Loads the seed document whose fields define what can be searched.
///
/// Every failure here is fatal to the run: a missing file, a document that does
/// not parse, and a document without a single record.
pub fn load_seed<P: DocumentParser + ?Sized>(parser: &P, path: &Path) -> ScanResult<Vec<String>> {
    if !path.is_file() {
        return Err(ScanError::seed_not_found(path));
    }

    let records = parser.parse(path)?;
    if records.is_empty() {
        return Err(ScanError::no_records(path));
    }

    let fields = discover_fields(&records);
    debug!(
        "Seed document {} defines {} fields",
        path.display(),
        fields.len()
    );
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::XmlDocumentParser;
    use tempfile::tempdir;

    #[test]
    fn test_discover_fields_first_seen_order() {
        let records = vec![
            Record::from_iter([("uniquename", "item1"), ("label", "Webcam")]),
            Record::from_iter([("label", "Mouse Pad"), ("price", "12.00"), ("uniquename", "x")]),
            Record::from_iter([("supplier", "Gadget World")]),
        ];

        assert_eq!(
            discover_fields(&records),
            vec!["uniquename", "label", "price", "supplier"]
        );
    }

    #[test]
    fn test_discover_fields_empty() {
        assert!(discover_fields(&[]).is_empty());
    }

    #[test]
    fn test_load_seed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("item000001.xml");
        std::fs::write(
            &path,
            "<stockItem><item><uniquename>item000001</uniquename><type>Wearables</type></item></stockItem>",
        )
        .unwrap();

        let fields = load_seed(&XmlDocumentParser::default(), &path).unwrap();
        assert_eq!(fields, vec!["uniquename", "type"]);
    }

    #[test]
    fn test_load_seed_failures() {
        let dir = tempdir().unwrap();
        let parser = XmlDocumentParser::default();

        let missing = load_seed(&parser, &dir.path().join("nope.xml"));
        assert!(matches!(missing, Err(ScanError::SeedNotFound(_))));

        let wrong_root = dir.path().join("wrong.xml");
        std::fs::write(&wrong_root, "<catalog><item><a>1</a></item></catalog>").unwrap();
        assert!(matches!(
            load_seed(&parser, &wrong_root),
            Err(ScanError::MissingRoot { .. })
        ));

        let empty = dir.path().join("empty.xml");
        std::fs::write(&empty, "<stockItem></stockItem>").unwrap();
        assert!(matches!(
            load_seed(&parser, &empty),
            Err(ScanError::NoRecords(_))
        ));

        let broken = dir.path().join("broken.xml");
        std::fs::write(&broken, "<stockItem><item>").unwrap();
        assert!(matches!(
            load_seed(&parser, &broken),
            Err(ScanError::Parse { .. })
        ));
    }
}
