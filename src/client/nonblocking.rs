//! Async listing client

use reqwest::Method;
use serde_json::Value;

use super::api::{Call, ListingApi};
use super::types::{AgentStatus, ListingIdentifier, SteamId};
use crate::errors::Result;
use crate::executor::Params;
use crate::listing::{Currencies, Listing, ListingSpec};
use crate::transport::{HttpTransport, Transport};

/// Listing client that suspends the calling task while a request is in flight.
///
/// Same operations and outcomes as [`super::BackpackTf`]; the only await point in
/// each call is the transport round trip.
#[derive(Debug)]
pub struct AsyncBackpackTf<T = HttpTransport> {
    api: ListingApi,
    transport: T,
}

impl AsyncBackpackTf<HttpTransport> {
    pub fn new(api: ListingApi) -> Self {
        Self::with_transport(api, HttpTransport::new())
    }
}

impl<T: Transport> AsyncBackpackTf<T> {
    pub fn with_transport(api: ListingApi, transport: T) -> Self {
        Self { api, transport }
    }

    pub fn api(&self) -> &ListingApi {
        &self.api
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn run<R>(&self, call: Call<R>) -> Result<R> {
        let response = self.transport.send(call.request()).await?;
        call.finish(response)
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: Params,
        body: Option<Value>,
    ) -> Result<Value> {
        self.run(self.api.request(method, path, params, body)?).await
    }

    pub async fn is_banned(&self, steam_id: impl Into<SteamId>) -> Result<bool> {
        self.run(self.api.is_banned(steam_id)?).await
    }

    pub async fn get_snapshot(&self, item_name: &str) -> Result<Value> {
        self.run(self.api.get_snapshot(item_name)?).await
    }

    pub async fn get_listing(&self, listing_id: &str) -> Result<Value> {
        self.run(self.api.get_listing(listing_id)?).await
    }

    pub async fn get_user_trade_url(&self, listing_id: &str) -> Result<String> {
        self.run(self.api.get_user_trade_url(listing_id)?).await
    }

    pub async fn get_listings(&self, skip: u32, limit: u32) -> Result<Value> {
        self.run(self.api.get_listings(skip, limit)?).await
    }

    pub async fn create_listing(
        &self,
        sku: &str,
        intent: &str,
        currencies: &Currencies,
        details: &str,
        asset_id: u64,
    ) -> Result<Listing> {
        self.run(self.api.create_listing(sku, intent, currencies, details, asset_id)?)
            .await
    }

    pub async fn create_listings(&self, listings: &[ListingSpec]) -> Result<Vec<Result<Listing>>> {
        self.run(self.api.create_listings(listings)?).await
    }

    pub async fn delete_all_listings(&self) -> Result<Value> {
        self.run(self.api.delete_all_listings()?).await
    }

    pub async fn delete_listing(&self, listing_id: &str) -> Result<Value> {
        self.run(self.api.delete_listing(listing_id)?).await
    }

    pub async fn delete(&self, identifier: &ListingIdentifier) -> Result<Value> {
        self.run(self.api.delete(identifier)?).await
    }

    pub async fn delete_listing_by_asset_id(&self, asset_id: u64) -> Result<Value> {
        self.run(self.api.delete_listing_by_asset_id(asset_id)?).await
    }

    pub async fn delete_listing_by_item_name(&self, item_name: &str, is_hash: bool) -> Result<Value> {
        self.run(self.api.delete_listing_by_item_name(item_name, is_hash)?)
            .await
    }

    pub async fn delete_listing_by_sku(&self, sku: &str) -> Result<Value> {
        self.run(self.api.delete_listing_by_sku(sku)?).await
    }

    pub async fn register_user_agent(&self) -> Result<AgentStatus> {
        self.run(self.api.register_user_agent()?).await
    }

    pub async fn get_user_agent_status(&self) -> Result<AgentStatus> {
        self.run(self.api.get_user_agent_status()?).await
    }

    pub async fn stop_user_agent(&self) -> Result<AgentStatus> {
        self.run(self.api.stop_user_agent()?).await
    }
}
