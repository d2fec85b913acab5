//! Listing lifecycle clients
//!
//! [`ListingApi`] turns each operation into a prepared [`Call`]. [`BackpackTf`] sends
//! calls on the current thread, [`AsyncBackpackTf`] awaits them; neither adds logic of
//! its own, so both report the same results and errors for the same inputs.
//!
//! # Addressing listings
//!
//! Deletes accept any [`ListingIdentifier`]:
//!
//! - raw listing id
//! - `440_{assetid}` for sell listings
//! - `440_{steamid}_{md5(base name)}` for buy listings, from an item name, its hash or a SKU

mod api;
mod blocking;
mod nonblocking;
mod types;

pub use api::{Call, ListingApi};
pub use blocking::BackpackTf;
pub use nonblocking::AsyncBackpackTf;
pub use types::{AgentStatus, ListingIdentifier, SteamId};
