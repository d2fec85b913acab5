//! Identifiers and small response types used by the listing clients

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::APP_ID;
use crate::errors::Result;
use crate::identity::{item_hash, ItemHash, ItemResolver};

/// SteamID64, accepted as a number or a string and always sent as a string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SteamId(String);

impl SteamId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for SteamId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for SteamId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SteamId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&SteamId> for SteamId {
    fn from(id: &SteamId) -> Self {
        id.clone()
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The ways a listing can be addressed for deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingIdentifier {
    /// Listing id exactly as the API reports it
    Id(String),
    /// Sell listing for an inventory asset: `440_{assetid}`
    AssetId(u64),
    /// Buy listing for an item by base name: `440_{steamid}_{md5(name)}`
    ItemName(String),
    /// Same as `ItemName` with the digest already computed
    ItemHash(ItemHash),
    /// Buy listing for the item a SKU resolves to
    Sku(String),
}

impl ListingIdentifier {
    /// Canonical listing id string for the account `steam_id`
    pub fn resolve(&self, steam_id: &SteamId, resolver: &ItemResolver) -> Result<String> {
        match self {
            ListingIdentifier::Id(id) => Ok(id.clone()),
            ListingIdentifier::AssetId(asset_id) => Ok(format!("{}_{}", APP_ID, asset_id)),
            ListingIdentifier::ItemName(name) => Ok(item_listing_id(steam_id, &item_hash(name))),
            ListingIdentifier::ItemHash(hash) => Ok(item_listing_id(steam_id, hash)),
            ListingIdentifier::Sku(sku) => Ok(item_listing_id(steam_id, &resolver.hash(sku)?)),
        }
    }
}

fn item_listing_id(steam_id: &SteamId, hash: &ItemHash) -> String {
    format!("{}_{}_{}", APP_ID, steam_id, hash)
}

/// User agent heartbeat state as reported by `/agent/*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub status: String,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub current_time: Option<i64>,
    #[serde(default)]
    pub expire_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AgentStatus {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}
