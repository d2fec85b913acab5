//! Operation planning shared by the blocking and async clients
//!
//! Every operation is turned into a [`Call`]: preconditions are checked, the request
//! is prepared and a decoder for the response is attached. A client only has to send
//! `call.request()` through its transport and pass the raw response to
//! [`Call::finish`], which keeps both execution models on the same code path.

use std::sync::Arc;

use log::warn;
use reqwest::Method;
use serde_json::Value;

use super::types::{AgentStatus, ListingIdentifier, SteamId};
use crate::config::Settings;
use crate::consts::APP_ID;
use crate::errors::{Error, Result};
use crate::executor::{Credentials, Params, RequestExecutor};
use crate::identity::{ItemHash, ItemResolver};
use crate::listing::{Currencies, Listing, ListingBuilder, ListingSpec};
use crate::schema::ItemSchema;
use crate::transport::{ApiRequest, ApiResponse, RawResponse};

const LISTINGS_PATH: &str = "/v2/classifieds/listings";
const BATCH_PATH: &str = "/v2/classifieds/listings/batch";
const SNAPSHOT_PATH: &str = "/classifieds/listings/snapshot";
const USER_INFO_PATH: &str = "/users/info/v1";

type Decoder<T> = Box<dyn FnOnce(ApiResponse) -> Result<T> + Send + Sync>;

/// A prepared request together with the decoder for its response
pub struct Call<T> {
    request: ApiRequest,
    decode: Decoder<T>,
}

impl<T> Call<T> {
    fn new(request: ApiRequest, decode: impl FnOnce(ApiResponse) -> Result<T> + Send + Sync + 'static) -> Self {
        Self {
            request,
            decode: Box::new(decode),
        }
    }

    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    pub fn finish(self, response: RawResponse) -> Result<T> {
        let response = RequestExecutor::complete(response)?;
        (self.decode)(response)
    }
}

impl Call<Value> {
    fn json(request: ApiRequest) -> Self {
        Self::new(request, |response| Ok(response.body))
    }
}

impl<T> std::fmt::Debug for Call<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Call").field("request", &self.request).finish_non_exhaustive()
    }
}

/// Path of a single listing. The id must stay one path segment.
fn listing_path(listing_id: &str) -> Result<String> {
    if listing_id.is_empty() || listing_id.contains(['/', '?', '#']) {
        return Err(Error::InvalidListingId(listing_id.to_string()));
    }
    Ok(format!("{}/{}", LISTINGS_PATH, listing_id))
}

fn param(name: &str, value: impl ToString) -> (String, String) {
    (name.to_string(), value.to_string())
}

/// Listing operations for one account, independent of how requests are sent
#[derive(Debug, Clone)]
pub struct ListingApi {
    executor: RequestExecutor,
    steam_id: SteamId,
    resolver: ItemResolver,
    builder: ListingBuilder,
}

impl ListingApi {
    pub fn new(credentials: Credentials, steam_id: impl Into<SteamId>, schema: Arc<dyn ItemSchema>) -> Self {
        let resolver = ItemResolver::new(schema);
        Self {
            executor: RequestExecutor::new(credentials),
            steam_id: steam_id.into(),
            builder: ListingBuilder::new(resolver.clone()),
            resolver,
        }
    }

    pub fn from_settings(settings: &Settings, schema: Arc<dyn ItemSchema>) -> Self {
        Self::new(
            settings.credentials(),
            settings.credentials.steam_id.as_str(),
            schema,
        )
        .with_user_agent(&settings.client.user_agent)
        .with_base_url(settings.client.base_url.as_str())
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.executor = self.executor.with_user_agent(user_agent);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.executor = self.executor.with_base_url(base_url);
        self
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn resolver(&self) -> &ItemResolver {
        &self.resolver
    }

    pub fn builder(&self) -> &ListingBuilder {
        &self.builder
    }

    pub fn steam_id(&self) -> &SteamId {
        &self.steam_id
    }

    fn require_token(&self) -> Result<()> {
        self.executor.credentials().require_token().map(|_| ())
    }

    pub fn request(&self, method: Method, path: &str, params: Params, body: Option<Value>) -> Result<Call<Value>> {
        let request = self.executor.prepare(method, path, params, body)?;
        Ok(Call::json(request))
    }

    pub fn is_banned(&self, steam_id: impl Into<SteamId>) -> Result<Call<bool>> {
        self.executor.credentials().require_api_key()?;
        self.require_token()?;

        let steam_id: SteamId = steam_id.into();
        let steam_id = steam_id.as_str().to_string();
        let request = self.executor.prepare(
            Method::GET,
            USER_INFO_PATH,
            vec![param("steamids", &steam_id)],
            None,
        )?;

        Ok(Call::new(request, move |response| {
            let user = response
                .body
                .get("users")
                .and_then(|users| users.get(&steam_id))
                .ok_or(Error::UserNotFound { steam_id })?;

            Ok(user.get("bans").is_some_and(|bans| !bans.is_null()))
        }))
    }

    pub fn get_snapshot(&self, item_name: &str) -> Result<Call<Value>> {
        self.request(
            Method::GET,
            SNAPSHOT_PATH,
            vec![param("appid", APP_ID), param("sku", item_name)],
            None,
        )
    }

    pub fn get_listing(&self, listing_id: &str) -> Result<Call<Value>> {
        self.require_token()?;

        self.request(Method::GET, &listing_path(listing_id)?, Params::new(), None)
    }

    pub fn get_user_trade_url(&self, listing_id: &str) -> Result<Call<String>> {
        let request = self.get_listing(listing_id)?.request;
        Ok(Call::new(request, |response| {
            Ok(response
                .body
                .get("user")
                .and_then(|user| user.get("tradeOfferUrl"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string())
        }))
    }

    pub fn get_listings(&self, skip: u32, limit: u32) -> Result<Call<Value>> {
        self.request(
            Method::GET,
            LISTINGS_PATH,
            vec![param("skip", skip), param("limit", limit)],
            None,
        )
    }

    pub fn create_listing(
        &self,
        sku: &str,
        intent: &str,
        currencies: &Currencies,
        details: &str,
        asset_id: u64,
    ) -> Result<Call<Listing>> {
        self.require_token()?;

        let payload = self.builder.build(sku, intent, currencies, details, asset_id)?;
        let body = serde_json::to_value(&payload)?;
        let request = self.executor.prepare(Method::POST, LISTINGS_PATH, Params::new(), Some(body))?;

        Ok(Call::new(request, ApiResponse::decode))
    }

    /// One request for all rows. Rows the API rejected come back as `Err` in their slot.
    pub fn create_listings(&self, listings: &[ListingSpec]) -> Result<Call<Vec<Result<Listing>>>> {
        self.require_token()?;

        let payloads = self.builder.build_batch(listings)?;
        let body = serde_json::to_value(&payloads)?;
        let request = self.executor.prepare(Method::POST, BATCH_PATH, Params::new(), Some(body))?;

        Ok(Call::new(request, |response| {
            let status = response.status;
            let rows = match response.body {
                Value::Array(rows) => rows,
                other => {
                    return Err(Error::RequestFailed {
                        status,
                        body: other.to_string(),
                    })
                }
            };

            Ok(rows
                .into_iter()
                .enumerate()
                .map(|(index, row)| decode_batch_row(index, row))
                .collect())
        }))
    }

    pub fn delete_all_listings(&self) -> Result<Call<Value>> {
        self.request(Method::DELETE, LISTINGS_PATH, Params::new(), None)
    }

    pub fn delete_listing(&self, listing_id: &str) -> Result<Call<Value>> {
        self.require_token()?;

        self.request(Method::DELETE, &listing_path(listing_id)?, Params::new(), None)
    }

    /// Delete whatever listing `identifier` resolves to
    pub fn delete(&self, identifier: &ListingIdentifier) -> Result<Call<Value>> {
        self.require_token()?;

        let listing_id = self.listing_id(identifier)?;
        self.delete_listing(&listing_id)
    }

    pub fn delete_listing_by_asset_id(&self, asset_id: u64) -> Result<Call<Value>> {
        self.delete(&ListingIdentifier::AssetId(asset_id))
    }

    pub fn delete_listing_by_item_name(&self, item_name: &str, is_hash: bool) -> Result<Call<Value>> {
        let identifier = if is_hash {
            ListingIdentifier::ItemHash(ItemHash::from_hex(item_name))
        } else {
            ListingIdentifier::ItemName(item_name.to_string())
        };
        self.delete(&identifier)
    }

    pub fn delete_listing_by_sku(&self, sku: &str) -> Result<Call<Value>> {
        self.require_token()?;

        let item_hash = self.resolver.hash(sku)?;
        self.delete_listing_by_item_name(item_hash.as_str(), true)
    }

    pub fn listing_id(&self, identifier: &ListingIdentifier) -> Result<String> {
        identifier.resolve(&self.steam_id, &self.resolver)
    }

    pub fn register_user_agent(&self) -> Result<Call<AgentStatus>> {
        self.agent("/agent/pulse")
    }

    pub fn get_user_agent_status(&self) -> Result<Call<AgentStatus>> {
        self.agent("/agent/status")
    }

    pub fn stop_user_agent(&self) -> Result<Call<AgentStatus>> {
        self.agent("/agent/stop")
    }

    fn agent(&self, path: &str) -> Result<Call<AgentStatus>> {
        let request = self.executor.prepare(Method::POST, path, Params::new(), None)?;
        Ok(Call::new(request, ApiResponse::decode))
    }
}

fn decode_batch_row(index: usize, row: Value) -> Result<Listing> {
    let Some(result) = row.get("result") else {
        warn!("Batch row {} was not created: {}", index, row);
        return Err(Error::RowFailed {
            index,
            detail: row.to_string(),
        });
    };

    serde_json::from_value(result.clone()).map_err(|e| Error::RowFailed {
        index,
        detail: e.to_string(),
    })
}
