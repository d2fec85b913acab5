#![deny(unreachable_pub)]
pub mod client;
pub mod config;
mod consts;
mod errors;
pub mod executor;
pub mod identity;
pub mod listing;
pub mod schema;
pub mod transport;
pub use client::{
    AgentStatus, AsyncBackpackTf, BackpackTf, Call, ListingApi, ListingIdentifier, SteamId,
};
pub use consts::{
    library_label, APP_ID, BASE_URL, DEFAULT_LIMIT, DEFAULT_SKIP, DEFAULT_USER_AGENT,
    LIBRARY_NAME, LIBRARY_VERSION,
};
pub use errors::{Error, Result};
pub use executor::{Credentials, Params, RequestExecutor};
pub use identity::{item_hash, ItemHash, ItemIdentity, ItemResolver};
pub use listing::{
    CurrencyAmount, Currencies, Listing, ListingBuilder, ListingIntent, ListingItem,
    ListingPayload, ListingSpec, Quality, UserAgent,
};
pub use schema::{ItemSchema, MapSchema, ParsedSku};
pub use transport::{
    ApiRequest, ApiResponse, BlockingTransport, HttpBlockingTransport, HttpTransport,
    RawResponse, Transport,
};
