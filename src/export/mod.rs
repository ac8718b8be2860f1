//! Result writers: JSON and CSV files built over the sink interface.
//!
//! Both exporters collect items during the crawl and write on `flush()`.
//! Writes are plain buffered writes; durability beyond that is the caller's
//! concern.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::extract::{Item, META_KEY};
use crate::sink::ResultSink;

/// Canonical column order; inferred fields follow alphabetically.
const CANONICAL_ORDER: &[&str] = &[
    "title",
    "link",
    "image",
    "price",
    "price_normalized",
    "description",
];

/// Collects items and writes them as a pretty-printed JSON array.
#[derive(Debug)]
pub struct JsonExporter {
    path: PathBuf,
    items: Mutex<Vec<Item>>,
}

impl JsonExporter {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write all collected items to the configured path.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be created or written.
    pub fn flush(&self) -> Result<()> {
        let items = self
            .items
            .lock()
            .map_err(|_| anyhow::anyhow!("exporter poisoned"))?;
        let file = File::create(&self.path)
            .with_context(|| format!("creating {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &*items)
            .with_context(|| format!("writing {}", self.path.display()))?;
        writer.flush().context("flushing JSON output")?;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for JsonExporter {
    fn on_item(&self, item: &Item) {
        if let Ok(mut items) = self.items.lock() {
            items.push(item.clone());
        }
    }
}

/// Collects items and writes them as CSV with a union header.
#[derive(Debug)]
pub struct CsvExporter {
    path: PathBuf,
    items: Mutex<Vec<Item>>,
}

impl CsvExporter {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write all collected items to the configured path.
    ///
    /// The header is the union of keys across items: canonical fields in
    /// their usual order, inferred fields sorted after them. Metadata under
    /// the reserved key is omitted.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be created or written.
    pub fn flush(&self) -> Result<()> {
        let items = self
            .items
            .lock()
            .map_err(|_| anyhow::anyhow!("exporter poisoned"))?;
        let header = header_for(&items);

        let file = File::create(&self.path)
            .with_context(|| format!("creating {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "{}",
            header
                .iter()
                .map(|column| csv_escape(column))
                .collect::<Vec<_>>()
                .join(",")
        )?;
        for item in items.iter() {
            let row = header
                .iter()
                .map(|column| csv_escape(&cell_value(item, column)))
                .collect::<Vec<_>>()
                .join(",");
            writeln!(writer, "{row}")?;
        }
        writer.flush().context("flushing CSV output")?;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for CsvExporter {
    fn on_item(&self, item: &Item) {
        if let Ok(mut items) = self.items.lock() {
            items.push(item.clone());
        }
    }
}

fn header_for(items: &[Item]) -> Vec<String> {
    let mut extra: Vec<String> = Vec::new();
    for item in items {
        for key in item.keys() {
            if key == META_KEY
                || CANONICAL_ORDER.contains(&key.as_str())
                || extra.iter().any(|k| k == key)
            {
                continue;
            }
            extra.push(key.clone());
        }
    }
    extra.sort_unstable();

    let mut header: Vec<String> = CANONICAL_ORDER
        .iter()
        .filter(|column| items.iter().any(|item| item.contains(column)))
        .map(|column| (*column).to_string())
        .collect();
    header.extend(extra);
    header
}

fn cell_value(item: &Item, column: &str) -> String {
    match item.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(pairs: &[(&str, &str)]) -> Item {
        let mut item = Item::new();
        for (key, value) in pairs {
            item.set(*key, (*value).to_string());
        }
        item
    }

    #[test]
    fn json_exporter_writes_an_array() {
        let dir = std::env::temp_dir().join("pagesift_json_export_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("items.json");

        let exporter = JsonExporter::new(&path);
        exporter.on_item(&item(&[("title", "A"), ("link", "https://e.com/1")]));
        exporter.on_item(&item(&[("title", "B"), ("link", "https://e.com/2")]));
        exporter.flush().expect("flush succeeds");

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Item> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].get_str("title"), Some("A"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn csv_header_puts_canonical_fields_first() {
        let items = vec![
            item(&[("title", "A"), ("author", "Jane"), ("price", "$5")]),
            item(&[("title", "B"), ("badge", "Sale")]),
        ];
        let header = header_for(&items);
        assert_eq!(header, vec!["title", "price", "author", "badge"]);
    }

    #[test]
    fn csv_escapes_quotes_and_commas() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn csv_exporter_writes_rows() {
        let dir = std::env::temp_dir().join("pagesift_csv_export_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("items.csv");

        let exporter = CsvExporter::new(&path);
        exporter.on_item(&item(&[("title", "A, with comma"), ("price", "$5")]));
        exporter.flush().expect("flush succeeds");

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("title,price"));
        assert_eq!(lines.next(), Some("\"A, with comma\",$5"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
