//! Blocking listing client

use reqwest::Method;
use serde_json::Value;

use super::api::{Call, ListingApi};
use super::types::{AgentStatus, ListingIdentifier, SteamId};
use crate::errors::Result;
use crate::executor::Params;
use crate::listing::{Currencies, Listing, ListingSpec};
use crate::transport::{BlockingTransport, HttpBlockingTransport};

/// Listing client that blocks the calling thread for each request
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use backpack_tf::{BackpackTf, Credentials, Currencies, ListingApi, MapSchema};
///
/// let schema = MapSchema::load_from_file("schema.json")?;
/// let api = ListingApi::new(Credentials::new(token), "76561198253325712", Arc::new(schema));
/// let bptf = BackpackTf::new(api);
///
/// let listing = bptf.create_listing("263;6", "buy", &Currencies::new().with("metal", 0.11), "", 0)?;
/// bptf.delete_listing_by_sku("263;6")?;
/// ```
#[derive(Debug)]
pub struct BackpackTf<T = HttpBlockingTransport> {
    api: ListingApi,
    transport: T,
}

impl BackpackTf<HttpBlockingTransport> {
    pub fn new(api: ListingApi) -> Self {
        Self::with_transport(api, HttpBlockingTransport::new())
    }
}

impl<T: BlockingTransport> BackpackTf<T> {
    pub fn with_transport(api: ListingApi, transport: T) -> Self {
        Self { api, transport }
    }

    pub fn api(&self) -> &ListingApi {
        &self.api
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn run<R>(&self, call: Call<R>) -> Result<R> {
        let response = self.transport.send(call.request())?;
        call.finish(response)
    }

    pub fn request(&self, method: Method, path: &str, params: Params, body: Option<Value>) -> Result<Value> {
        self.run(self.api.request(method, path, params, body)?)
    }

    pub fn is_banned(&self, steam_id: impl Into<SteamId>) -> Result<bool> {
        self.run(self.api.is_banned(steam_id)?)
    }

    pub fn get_snapshot(&self, item_name: &str) -> Result<Value> {
        self.run(self.api.get_snapshot(item_name)?)
    }

    pub fn get_listing(&self, listing_id: &str) -> Result<Value> {
        self.run(self.api.get_listing(listing_id)?)
    }

    pub fn get_user_trade_url(&self, listing_id: &str) -> Result<String> {
        self.run(self.api.get_user_trade_url(listing_id)?)
    }

    pub fn get_listings(&self, skip: u32, limit: u32) -> Result<Value> {
        self.run(self.api.get_listings(skip, limit)?)
    }

    pub fn create_listing(
        &self,
        sku: &str,
        intent: &str,
        currencies: &Currencies,
        details: &str,
        asset_id: u64,
    ) -> Result<Listing> {
        self.run(self.api.create_listing(sku, intent, currencies, details, asset_id)?)
    }

    pub fn create_listings(&self, listings: &[ListingSpec]) -> Result<Vec<Result<Listing>>> {
        self.run(self.api.create_listings(listings)?)
    }

    pub fn delete_all_listings(&self) -> Result<Value> {
        self.run(self.api.delete_all_listings()?)
    }

    pub fn delete_listing(&self, listing_id: &str) -> Result<Value> {
        self.run(self.api.delete_listing(listing_id)?)
    }

    pub fn delete(&self, identifier: &ListingIdentifier) -> Result<Value> {
        self.run(self.api.delete(identifier)?)
    }

    pub fn delete_listing_by_asset_id(&self, asset_id: u64) -> Result<Value> {
        self.run(self.api.delete_listing_by_asset_id(asset_id)?)
    }

    pub fn delete_listing_by_item_name(&self, item_name: &str, is_hash: bool) -> Result<Value> {
        self.run(self.api.delete_listing_by_item_name(item_name, is_hash)?)
    }

    pub fn delete_listing_by_sku(&self, sku: &str) -> Result<Value> {
        self.run(self.api.delete_listing_by_sku(sku)?)
    }

    pub fn register_user_agent(&self) -> Result<AgentStatus> {
        self.run(self.api.register_user_agent()?)
    }

    pub fn get_user_agent_status(&self) -> Result<AgentStatus> {
        self.run(self.api.get_user_agent_status()?)
    }

    pub fn stop_user_agent(&self) -> Result<AgentStatus> {
        self.run(self.api.stop_user_agent()?)
    }
}
