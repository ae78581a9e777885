use encoding_rs::{UTF_16BE, UTF_16LE, WINDOWS_1252};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::fallback::fallback_products;
use crate::models::Product;

const BOM: char = '\u{feff}';

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Catalog file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Catalog is not valid JSON (decoded as {encoding}): {source}")]
    InvalidJson {
        encoding: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected catalog format: {0}")]
    Format(String),

    #[error("No candidate encoding could read {0}")]
    Exhausted(PathBuf),
}

/// Text encodings tried when reading the catalog, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf16Le,
    Utf16,
    Utf8,
    Utf8Sig,
    Latin1,
    Cp1252,
}

impl TextEncoding {
    pub const CANDIDATES: [TextEncoding; 6] = [
        TextEncoding::Utf16Le,
        TextEncoding::Utf16,
        TextEncoding::Utf8,
        TextEncoding::Utf8Sig,
        TextEncoding::Latin1,
        TextEncoding::Cp1252,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf16Le => "utf-16-le",
            Self::Utf16 => "utf-16",
            Self::Utf8 => "utf-8",
            Self::Utf8Sig => "utf-8-sig",
            Self::Latin1 => "latin-1",
            Self::Cp1252 => "cp1252",
        }
    }

    /// Strict decode. `None` means the bytes are not valid in this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf16Le => UTF_16LE
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
            Self::Utf16 => {
                // BOM menentukan endianness, default little-endian
                let (encoding, body) = match bytes {
                    [0xFE, 0xFF, rest @ ..] => (UTF_16BE, rest),
                    [0xFF, 0xFE, rest @ ..] => (UTF_16LE, rest),
                    _ => (UTF_16LE, bytes),
                };
                encoding
                    .decode_without_bom_handling_and_without_replacement(body)
                    .map(|text| text.into_owned())
            }
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            Self::Utf8Sig => {
                let body = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
                std::str::from_utf8(body).ok().map(str::to_string)
            }
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Cp1252 => WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
        }
    }
}

/// Where the in-memory catalog came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOrigin {
    File { encoding: &'static str },
    Fallback { reason: String },
}

impl CatalogOrigin {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

impl fmt::Display for CatalogOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { encoding } => write!(f, "file ({})", encoding),
            Self::Fallback { .. } => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub products: Vec<Product>,
    pub origin: CatalogOrigin,
}

impl LoadedCatalog {
    pub fn fallback(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!("Using fallback product data ({})", reason);
        Self {
            products: fallback_products(),
            origin: CatalogOrigin::Fallback { reason },
        }
    }
}

/// Reads `products.json`, tolerating the text encodings that Windows editors
/// and spreadsheet exports tend to produce.
pub struct CatalogLoader {
    path: PathBuf,
}

impl CatalogLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the catalog products. Never fails; falls back to synthetic data.
    pub fn load(&self) -> Vec<Product> {
        self.load_catalog().products
    }

    /// Like [`load`](Self::load) but also reports where the products came from.
    pub fn load_catalog(&self) -> LoadedCatalog {
        match self.try_load() {
            Ok(catalog) => catalog,
            Err(e) => {
                match &e {
                    LoadError::NotFound(path) => {
                        error!("Catalog file does not exist: {}", path.display());
                    }
                    LoadError::Exhausted(path) => {
                        error!(
                            "All {} encodings failed for {}",
                            TextEncoding::CANDIDATES.len(),
                            path.display()
                        );
                    }
                    other => {
                        error!("Failed to load catalog from {}: {:?}", self.path.display(), other);
                    }
                }
                LoadedCatalog::fallback(e.to_string())
            }
        }
    }

    fn try_load(&self) -> Result<LoadedCatalog, LoadError> {
        let bytes = fs::read(&self.path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound(self.path.clone()),
            _ => LoadError::Io {
                path: self.path.clone(),
                source,
            },
        })?;
        debug!("Read catalog file {:?} ({} bytes)", self.path, bytes.len());

        let (encoding, document) = first_success(TextEncoding::CANDIDATES, |encoding| {
            Self::parse_with(encoding, &bytes)
        })?
        .ok_or_else(|| LoadError::Exhausted(self.path.clone()))?;

        let products = Self::extract_products(&document)?;
        info!(
            "Loaded {} products from {} using {} encoding",
            products.len(),
            self.path.display(),
            encoding.name()
        );

        Ok(LoadedCatalog {
            products,
            origin: CatalogOrigin::File {
                encoding: encoding.name(),
            },
        })
    }

    /// `Ok(None)` means "wrong encoding, try the next one".
    fn parse_with(
        encoding: TextEncoding,
        bytes: &[u8],
    ) -> Result<Option<(TextEncoding, Value)>, LoadError> {
        let Some(text) = encoding.decode(bytes) else {
            debug!("Catalog is not valid {}", encoding.name());
            return Ok(None);
        };
        let text = text.strip_prefix(BOM).unwrap_or(&text);

        match serde_json::from_str::<Value>(text) {
            Ok(document) => Ok(Some((encoding, document))),
            // Teks terbaca tapi JSON rusak: encoding lain tidak akan membantu
            Err(source) if looks_like_json(text) => {
                warn!(
                    "Catalog decoded as {} but JSON is invalid: {}",
                    encoding.name(),
                    source
                );
                Err(LoadError::InvalidJson {
                    encoding: encoding.name(),
                    source,
                })
            }
            Err(e) => {
                debug!("Catalog decoded as {} is not JSON: {}", encoding.name(), e);
                Ok(None)
            }
        }
    }

    fn extract_products(document: &Value) -> Result<Vec<Product>, LoadError> {
        let obj = document
            .as_object()
            .ok_or_else(|| LoadError::Format("top-level value is not an object".to_string()))?;

        match obj.get("products") {
            None | Some(Value::Null) => {
                warn!("Catalog has no 'products' array, catalog is empty");
                Ok(Vec::new())
            }
            Some(Value::Array(items)) => Ok(items.iter().map(Product::normalize).collect()),
            Some(_) => Err(LoadError::Format("'products' is not an array".to_string())),
        }
    }
}

fn looks_like_json(text: &str) -> bool {
    matches!(text.trim_start().chars().next(), Some('{') | Some('['))
}

/// Run `attempt` over `candidates` in order, stopping at the first success.
///
/// `Ok(None)` from an attempt moves on to the next candidate, `Err` stops
/// immediately. Returns `Ok(None)` when every candidate was skipped.
pub fn first_success<I, T, E, F>(candidates: I, mut attempt: F) -> Result<Option<T>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Result<Option<T>, E>,
{
    for candidate in candidates {
        if let Some(found) = attempt(candidate)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const CATALOG: &str = r#"{
  "products": [
    {
      "id": "P001",
      "name": "iPhone 15 Pro",
      "category": "smartphone",
      "brand": "Apple",
      "price": 21999000,
      "currency": "IDR",
      "description": "Chip A17 Pro, kamera 48MP, café edition",
      "specifications": { "rating": 4.9, "stock": 12, "shop_name": "iBox" },
      "images": ["https://example.com/p001.jpg"],
      "url": "https://example.com/p001"
    },
    {
      "id": "L001",
      "name": "MacBook Pro 14",
      "category": "laptop",
      "brand": "Apple",
      "price": 37999000
    }
  ]
}"#;

    fn write_catalog(dir: &TempDir, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join("products.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    fn utf16le(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    fn utf16be(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
    }

    fn latin1(text: &str) -> Vec<u8> {
        text.chars().map(|c| u8::try_from(u32::from(c)).unwrap()).collect()
    }

    fn load_bytes(bytes: &[u8]) -> LoadedCatalog {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(&dir, bytes);
        CatalogLoader::new(path).load_catalog()
    }

    #[test]
    fn test_loads_every_candidate_encoding_identically() {
        let expected = load_bytes(CATALOG.as_bytes());
        assert_eq!(expected.origin, CatalogOrigin::File { encoding: "utf-8" });
        assert_eq!(expected.products.len(), 2);

        let mut bom_le = vec![0xFF, 0xFE];
        bom_le.extend(utf16le(CATALOG));
        let mut bom_be = vec![0xFE, 0xFF];
        bom_be.extend(utf16be(CATALOG));
        let mut bom_utf8 = vec![0xEF, 0xBB, 0xBF];
        bom_utf8.extend(CATALOG.as_bytes());

        let cases = [
            (utf16le(CATALOG), "utf-16-le"),
            (bom_le, "utf-16-le"),
            (bom_be, "utf-16"),
            (bom_utf8, "utf-8"),
            (latin1(CATALOG), "latin-1"),
        ];

        for (bytes, encoding) in cases {
            let loaded = load_bytes(&bytes);
            assert_eq!(loaded.origin, CatalogOrigin::File { encoding });
            assert_eq!(loaded.products, expected.products, "encoding {}", encoding);
        }
    }

    #[test]
    fn test_missing_file_returns_fallback() {
        let dir = TempDir::new().unwrap();
        let loader = CatalogLoader::new(dir.path().join("missing.json"));

        let loaded = loader.load_catalog();

        assert!(loaded.origin.is_fallback());
        assert_eq!(loaded.products, fallback_products());
        assert_eq!(loader.load(), fallback_products());
    }

    #[test]
    fn test_read_errors_are_classified() {
        let dir = TempDir::new().unwrap();

        let missing = CatalogLoader::new(dir.path().join("missing.json")).try_load();
        assert!(matches!(missing, Err(LoadError::NotFound(_))));

        // direktori ada tapi tidak bisa dibaca sebagai file
        let unreadable = CatalogLoader::new(dir.path()).try_load();
        assert!(matches!(unreadable, Err(LoadError::Io { .. })));
        assert!(CatalogLoader::new(dir.path()).load_catalog().origin.is_fallback());
    }

    #[test]
    fn test_malformed_json_fails_fast_to_fallback() {
        let loaded = load_bytes(br#"{"products": [ {"id": "P001",, } "#);

        match loaded.origin {
            CatalogOrigin::Fallback { reason } => assert!(reason.contains("utf-8")),
            other => panic!("expected fallback, got {:?}", other),
        }
        assert_eq!(loaded.products, fallback_products());
    }

    #[test]
    fn test_products_must_be_an_array() {
        let loaded = load_bytes(br#"{"products": {"id": "P001"}}"#);
        assert!(loaded.origin.is_fallback());

        let loaded = load_bytes(br#"[{"id": "P001"}]"#);
        assert!(loaded.origin.is_fallback());
    }

    #[test]
    fn test_document_without_products_is_empty_catalog() {
        let loaded = load_bytes(br#"{"items": []}"#);

        assert_eq!(loaded.origin, CatalogOrigin::File { encoding: "utf-8" });
        assert!(loaded.products.is_empty());
    }

    #[test]
    fn test_records_are_normalized() {
        let loaded = load_bytes(CATALOG.as_bytes());
        let macbook = &loaded.products[1];

        assert_eq!(macbook.currency, "IDR");
        assert_eq!(macbook.specifications.condition, "Baru");
        assert!(macbook.images.is_empty());
        assert_eq!(macbook.url, "");
    }

    #[test]
    fn test_strict_decoders() {
        assert_eq!(TextEncoding::Utf8.decode(&[0xE9, 0x41]), None);
        assert_eq!(TextEncoding::Utf16Le.decode(&[0x7B]), None);
        assert_eq!(
            TextEncoding::Latin1.decode(&[0x63, 0x61, 0x66, 0xE9]),
            Some("café".to_string())
        );
        assert_eq!(
            TextEncoding::Utf8Sig.decode(&[0xEF, 0xBB, 0xBF, 0x7B, 0x7D]),
            Some("{}".to_string())
        );
    }

    #[test]
    fn test_first_success_stops_at_first_hit() {
        let mut tried = Vec::new();
        let result: Result<Option<i32>, ()> = first_success([1, 2, 3, 4], |n| {
            tried.push(n);
            Ok(if n >= 2 { Some(n * 10) } else { None })
        });

        assert_eq!(result, Ok(Some(20)));
        assert_eq!(tried, vec![1, 2]);
    }

    #[test]
    fn test_first_success_propagates_errors() {
        let result: Result<Option<i32>, &str> =
            first_success([1, 2, 3], |n| if n == 2 { Err("boom") } else { Ok(None) });
        assert_eq!(result, Err("boom"));

        let exhausted: Result<Option<i32>, ()> = first_success(Vec::<i32>::new(), |_| Ok(None));
        assert_eq!(exhausted, Ok(None));
    }
}
