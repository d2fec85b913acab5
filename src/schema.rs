//! Item schema lookups
//!
//! A SKU is the compact identity of a TF2 item: `"{defindex};{quality}"` optionally
//! followed by more `;`-separated modifiers (e.g. `"263;6;uncraftable"`).
//! The schema maps the defindex part to the item's base name; craftability and
//! quality come straight from the SKU itself.

use std::collections::HashMap;
use std::path::Path;

use crate::errors::{Error, Result};

const SKU_DELIMITER: char = ';';
const UNCRAFTABLE: &str = "uncraftable";

/// Structured view of a SKU string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSku {
    pub defindex: i64,
    pub quality: u32,
    pub craftable: bool,
}

impl ParsedSku {
    pub fn parse(sku: &str) -> Result<Self> {
        let mut parts = sku.split(SKU_DELIMITER);

        let defindex = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::resolution(sku, "missing defindex"))?
            .parse::<i64>()
            .map_err(|e| Error::resolution(sku, format!("invalid defindex: {}", e)))?;

        let quality = parts
            .next()
            .ok_or_else(|| Error::resolution(sku, "missing quality"))?
            .parse::<u32>()
            .map_err(|e| Error::resolution(sku, format!("invalid quality: {}", e)))?;

        let craftable = !parts.any(|modifier| modifier == UNCRAFTABLE);

        Ok(Self {
            defindex,
            quality,
            craftable,
        })
    }
}

/// Schema lookups needed to describe an item to the classifieds API
pub trait ItemSchema: Send + Sync {
    /// Base name of the item, without quality or other modifiers
    fn sku_to_base_name(&self, sku: &str) -> Result<String>;

    fn sku_is_craftable(&self, sku: &str) -> Result<bool> {
        Ok(ParsedSku::parse(sku)?.craftable)
    }

    fn sku_to_quality(&self, sku: &str) -> Result<u32> {
        Ok(ParsedSku::parse(sku)?.quality)
    }
}

/// Schema backed by a defindex -> base name table
#[derive(Debug, Clone, Default)]
pub struct MapSchema {
    names: HashMap<i64, String>,
}

impl MapSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i64, N)>,
        N: Into<String>,
    {
        Self {
            names: entries
                .into_iter()
                .map(|(defindex, name)| (defindex, name.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, defindex: i64, name: impl Into<String>) {
        self.names.insert(defindex, name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Parse a JSON object of the form `{"263": "Ellis' Cap", ...}`
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, String> =
            serde_json::from_str(json).map_err(|e| Error::Schema(e.to_string()))?;

        let mut schema = Self::new();
        for (defindex, name) in raw {
            let defindex = defindex
                .parse::<i64>()
                .map_err(|_| Error::Schema(format!("invalid defindex key '{}'", defindex)))?;
            schema.insert(defindex, name);
        }
        Ok(schema)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Schema(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }
}

impl ItemSchema for MapSchema {
    fn sku_to_base_name(&self, sku: &str) -> Result<String> {
        let parsed = ParsedSku::parse(sku)?;
        self.names
            .get(&parsed.defindex)
            .cloned()
            .ok_or_else(|| Error::resolution(sku, format!("unknown defindex {}", parsed.defindex)))
    }
}
