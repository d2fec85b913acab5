//! Command line access to the classifieds API
//!
//! ## Setup
//!
//! 1. Create a `.env` file in the project root (or a config file, see below):
//!    ```
//!    BPTF_CREDENTIALS__TOKEN=your-user-token
//!    BPTF_CREDENTIALS__STEAM_ID=76561198253325712
//!    BPTF_CREDENTIALS__API_KEY=your-api-key   # Optional: only for `banned`
//!    BPTF_SCHEMA__FILE=schema.json            # defindex -> base name map
//!    ```
//!
//! 2. Run a command:
//!    ```bash
//!    cargo run --bin bptf -- listings
//!    cargo run --bin bptf -- --config bptf.toml delete-sku "263;6"
//!    ```

use std::env;
use std::sync::Arc;

use log::{error, info, warn};
use serde_json::Value;

use backpack_tf::{
    config::Settings, item_hash, AsyncBackpackTf, ListingApi, MapSchema, DEFAULT_LIMIT,
    DEFAULT_SKIP,
};

const USAGE: &str = "usage: bptf [--config <file>] <command> [arg]

commands:
  listings               list your classifieds listings
  snapshot <name>        snapshot of all listings for an item
  hash <name>            listing hash of an item name
  delete-sku <sku>       delete your buy listing for a sku
  delete-asset <id>      delete your sell listing for an asset
  banned <steamid>       check whether a user is banned (needs an API key)
  pulse | status | stop  user agent heartbeat";

#[tokio::main]
async fn main() {
    match dotenvy::dotenv() {
        Ok(path) => eprintln!("Loaded environment from: {}", path.display()),
        Err(_) => eprintln!("No .env file found, using system environment variables"),
    }

    let mut args: Vec<String> = env::args().skip(1).collect();
    let config_path = if args.first().map(String::as_str) == Some("--config") && args.len() > 1 {
        let path = args.remove(1);
        args.remove(0);
        Some(path)
    } else {
        None
    };

    let Some(command) = args.first().cloned() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };
    let arg = args.get(1).cloned();

    // Hashing is local, no settings or client needed
    if command == "hash" {
        match arg {
            Some(name) => println!("{}", item_hash(&name)),
            None => {
                eprintln!("{}", USAGE);
                std::process::exit(2);
            }
        }
        return;
    }

    let settings = match config_path {
        Some(path) => Settings::new(&path),
        None => Settings::from_env(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(settings.log.level.as_str()))
        .init();

    let schema = match &settings.schema.file {
        Some(path) => match MapSchema::load_from_file(path) {
            Ok(schema) => {
                info!("Loaded {} schema entries from {}", schema.len(), path.display());
                schema
            }
            Err(e) => {
                error!("Failed to load schema: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            warn!("No schema file configured, sku lookups will fail");
            MapSchema::new()
        }
    };

    let api = ListingApi::from_settings(&settings, Arc::new(schema));
    let bptf = AsyncBackpackTf::new(api);

    let result: backpack_tf::Result<Value> = match (command.as_str(), arg) {
        ("listings", _) => bptf.get_listings(DEFAULT_SKIP, DEFAULT_LIMIT).await,
        ("snapshot", Some(name)) => bptf.get_snapshot(&name).await,
        ("delete-sku", Some(sku)) => bptf.delete_listing_by_sku(&sku).await,
        ("delete-asset", Some(asset_id)) => match asset_id.parse::<u64>() {
            Ok(asset_id) => bptf.delete_listing_by_asset_id(asset_id).await,
            Err(e) => {
                error!("Invalid asset id '{}': {}", asset_id, e);
                std::process::exit(2);
            }
        },
        ("banned", Some(steam_id)) => bptf.is_banned(steam_id).await.map(Value::Bool),
        ("pulse", _) => bptf.register_user_agent().await.and_then(to_value),
        ("status", _) => bptf.get_user_agent_status().await.and_then(to_value),
        ("stop", _) => bptf.stop_user_agent().await.and_then(to_value),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to render response: {}", e),
        },
        Err(e) => {
            error!("{} failed: {}", command, e);
            std::process::exit(1);
        }
    }
}

fn to_value<T: serde::Serialize>(value: T) -> backpack_tf::Result<Value> {
    Ok(serde_json::to_value(value)?)
}
