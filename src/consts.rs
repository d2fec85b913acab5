pub const BASE_URL: &str = "https://api.backpack.tf/api";

/// Team Fortress 2, the only game the classifieds endpoints are used for here
pub const APP_ID: u32 = 440;

pub const DEFAULT_SKIP: u32 = 0;
pub const DEFAULT_LIMIT: u32 = 100;

pub const DEFAULT_USER_AGENT: &str = "Listing goin' up!";

pub const LIBRARY_NAME: &str = env!("CARGO_PKG_NAME");
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Label appended to every `User-Agent` header, e.g. `backpack-tf v0.2.0`
pub fn library_label() -> String {
    format!("{} v{}", LIBRARY_NAME, LIBRARY_VERSION)
}
