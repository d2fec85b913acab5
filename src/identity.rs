//! Item identity resolution and listing hashes

use std::fmt;
use std::sync::Arc;

use crate::errors::Result;
use crate::schema::ItemSchema;

/// Resolved view of a SKU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemIdentity {
    pub base_name: String,
    pub craftable: bool,
    pub quality: u32,
}

/// Lowercase hex MD5 digest of an item's base name
///
/// Used by the API as the item part of a listing id (`440_{steamid}_{hash}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemHash(String);

impl ItemHash {
    /// Wrap a digest that was computed elsewhere
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash an item name exactly as the API does
pub fn item_hash(item_name: &str) -> ItemHash {
    ItemHash(format!("{:x}", md5::compute(item_name.as_bytes())))
}

/// Resolves SKUs through a schema. Every call is a fresh lookup.
#[derive(Clone)]
pub struct ItemResolver {
    schema: Arc<dyn ItemSchema>,
}

impl ItemResolver {
    pub fn new(schema: Arc<dyn ItemSchema>) -> Self {
        Self { schema }
    }

    pub fn resolve(&self, sku: &str) -> Result<ItemIdentity> {
        Ok(ItemIdentity {
            base_name: self.schema.sku_to_base_name(sku)?,
            craftable: self.schema.sku_is_craftable(sku)?,
            quality: self.schema.sku_to_quality(sku)?,
        })
    }

    pub fn hash(&self, sku: &str) -> Result<ItemHash> {
        let base_name = self.schema.sku_to_base_name(sku)?;
        Ok(item_hash(&base_name))
    }
}

impl fmt::Debug for ItemResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::schema::MapSchema;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_item_hash() {
        assert_eq!(
            item_hash("Mann Co. Supply Crate Key").as_str(),
            "d9f847ff5dfcf78576a9fca04cbf6c07"
        );
        assert_eq!(
            item_hash("Team Captain").as_str(),
            "a893c93bf986b65690e9e8b00bfc28e1"
        );
        assert_eq!(
            item_hash("Ellis' Cap").as_str(),
            "9e89a4a85aae68266ec992c22b0d52e2"
        );
    }

    #[test]
    fn test_resolve() {
        let resolver = ItemResolver::new(Arc::new(MapSchema::from_entries([(263, "Ellis' Cap")])));

        let identity = resolver.resolve("263;6").unwrap();
        assert_eq!(
            identity,
            ItemIdentity {
                base_name: "Ellis' Cap".to_string(),
                craftable: true,
                quality: 6,
            }
        );

        assert_eq!(resolver.hash("263;6").unwrap(), item_hash("Ellis' Cap"));
        assert!(matches!(resolver.resolve("264;6"), Err(Error::Resolution { .. })));
    }

    struct CountingSchema {
        lookups: AtomicUsize,
    }

    impl ItemSchema for CountingSchema {
        fn sku_to_base_name(&self, _sku: &str) -> Result<String> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok("Team Captain".to_string())
        }
    }

    #[test]
    fn test_no_caching() {
        let schema = Arc::new(CountingSchema {
            lookups: AtomicUsize::new(0),
        });
        let resolver = ItemResolver::new(schema.clone());

        resolver.hash("378;6").unwrap();
        resolver.hash("378;6").unwrap();
        assert_eq!(schema.lookups.load(Ordering::SeqCst), 2);
    }
}
