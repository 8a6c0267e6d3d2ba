//! Sample data: writes directories of random stock documents to scan.
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::document::Record;
use crate::errors::ScanResult;

const LABELS: &[&str] = &[
    "Wireless Mouse",
    "Gaming Keyboard",
    "Bluetooth Headphones",
    "USB-C Hub",
    "Mechanical Keyboard",
    "Webcam",
    "Monitor Stand",
    "Laptop Stand",
    "Mouse Pad",
    "External Hard Drive",
    "Gaming Chair",
    "Portable SSD",
    "Smartphone Stand",
    "USB Flash Drive",
    "HDMI Cable",
    "Docking Station",
    "Wireless Charger",
    "Webcam Cover",
    "Noise Cancelling Headphones",
    "Smartwatch",
    "Fitness Tracker",
];

const STOCKROOMS: &[&str] = &[
    "Main Warehouse",
    "Secondary Warehouse",
    "Tech Storage",
    "Accessories Shelf",
    "Electronics Corner",
    "Outlet Store",
    "Returns Processing",
    "Bulk Storage",
    "Display Area",
    "Online Fulfillment Center",
];

const TYPES: &[&str] = &[
    "Electronics",
    "Accessories",
    "Peripherals",
    "Furniture",
    "Wearables",
    "Networking",
];

const SUPPLIERS: &[&str] = &[
    "Tech Supplies Inc.",
    "Gamer Gear Ltd.",
    "Office Essentials Co.",
    "Gadget World",
    "Electro Depot",
    "Smart Tech Solutions",
    "Digital Universe",
    "Innovative Gadgets",
    "High-Tech Supplies",
    "Future Electronics",
    "Value Tech Products",
];

/// Builds the single stock item for document number `index` (1-based)
pub fn stock_item<R: Rng>(index: usize, rng: &mut R) -> Record {
    let commodity_code: String = (0..9)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();

    Record::from_iter([
        ("uniquename", format!("item{:06}", index)),
        ("label", pick(LABELS, rng).to_string()),
        ("stockroom", pick(STOCKROOMS, rng).to_string()),
        ("price", format!("{:.2}", rng.gen_range(10.0..100.0))),
        ("new_price", format!("{:.2}", rng.gen_range(5.0..95.0))),
        ("type", pick(TYPES, rng).to_string()),
        ("commodity_code", commodity_code),
        ("supplier", pick(SUPPLIERS, rng).to_string()),
    ])
}

fn pick<'a, R: Rng>(choices: &[&'a str], rng: &mut R) -> &'a str {
    choices[rng.gen_range(0..choices.len())]
}

/// Serializes records as `<root><record>...</record></root>` with an XML
/// declaration
pub fn render_document(records: &[Record], root: &str, record_element: &str) -> ScanResult<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(root)))?;
    for record in records {
        writer.write_event(Event::Start(BytesStart::new(record_element)))?;
        for (name, value) in record.iter() {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            writer.write_event(Event::Text(BytesText::new(value)))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        writer.write_event(Event::End(BytesEnd::new(record_element)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(root)))?;
    Ok(writer.into_inner())
}

/// Writes `count` stock documents named `item000001.xml`, `item000002.xml`, ...
/// into `output_dir`. The same `seed` always produces the same documents.
pub fn generate_documents(
    output_dir: &Path,
    count: usize,
    seed: Option<u64>,
) -> ScanResult<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut written = Vec::with_capacity(count);
    for index in 1..=count {
        let item = stock_item(index, &mut rng);
        let bytes = render_document(std::slice::from_ref(&item), "stockItem", "item")?;
        let path = output_dir.join(format!("item{:06}.xml", index));
        fs::write(&path, bytes)?;
        written.push(path);
    }

    info!(
        "{} XML files have been generated in {}",
        count,
        output_dir.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentParser, XmlDocumentParser};
    use tempfile::tempdir;

    #[test]
    fn test_stock_item_fields() {
        let mut rng = StdRng::seed_from_u64(7);
        let item = stock_item(42, &mut rng);

        assert_eq!(
            item.field_names().collect::<Vec<_>>(),
            vec![
                "uniquename",
                "label",
                "stockroom",
                "price",
                "new_price",
                "type",
                "commodity_code",
                "supplier"
            ]
        );
        assert_eq!(item.get("uniquename"), Some("item000042"));
        assert!(LABELS.contains(&item.get("label").unwrap()));
        assert!(TYPES.contains(&item.get("type").unwrap()));

        let code = item.get("commodity_code").unwrap();
        assert_eq!(code.len(), 9);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let price: f64 = item.get("price").unwrap().parse().unwrap();
        assert!((10.0..=100.0).contains(&price));
    }

    #[test]
    fn test_render_escapes_values() {
        let record = Record::from_iter([("label", "Cables & <Adapters>")]);
        let bytes = render_document(&[record], "stockItem", "item").unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(text.contains("Cables &amp; &lt;Adapters&gt;"));
    }

    #[test]
    fn test_generated_documents_parse_back() {
        let dir = tempdir().unwrap();
        let written = generate_documents(dir.path(), 5, Some(1)).unwrap();
        assert_eq!(written.len(), 5);
        assert_eq!(written[0], dir.path().join("item000001.xml"));

        let parser = XmlDocumentParser::default();
        for (i, path) in written.iter().enumerate() {
            let records = parser.parse(path).unwrap();
            assert_eq!(records.len(), 1);
            let expected = format!("item{:06}", i + 1);
            assert_eq!(records[0].get("uniquename"), Some(expected.as_str()));
        }
    }

    #[test]
    fn test_same_seed_same_documents() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        generate_documents(first.path(), 3, Some(99)).unwrap();
        generate_documents(second.path(), 3, Some(99)).unwrap();

        for name in ["item000001.xml", "item000002.xml", "item000003.xml"] {
            assert_eq!(
                fs::read(first.path().join(name)).unwrap(),
                fs::read(second.path().join(name)).unwrap()
            );
        }
    }
}
