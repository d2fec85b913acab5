//! Listing payloads sent to the classifieds API and listings returned by it

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Error, Result};
use crate::identity::ItemResolver;

/// Whether a listing buys or sells the item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingIntent {
    Buy,
    Sell,
}

impl ListingIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingIntent::Buy => "buy",
            ListingIntent::Sell => "sell",
        }
    }
}

impl FromStr for ListingIntent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "buy" => Ok(ListingIntent::Buy),
            "sell" => Ok(ListingIntent::Sell),
            other => Err(Error::InvalidIntent(other.to_string())),
        }
    }
}

impl fmt::Display for ListingIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Amount of a single currency
///
/// Whole amounts stay integers on the wire (`"keys": 1`), fractional ones are floats
/// (`"metal": 1.55`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CurrencyAmount {
    Whole(u64),
    Fractional(f64),
}

impl CurrencyAmount {
    /// NaN and infinity have no JSON form and would be sent as `null`
    pub fn is_finite(&self) -> bool {
        match *self {
            CurrencyAmount::Whole(_) => true,
            CurrencyAmount::Fractional(x) => x.is_finite(),
        }
    }
}

impl From<u64> for CurrencyAmount {
    fn from(n: u64) -> Self {
        CurrencyAmount::Whole(n)
    }
}

impl From<u32> for CurrencyAmount {
    fn from(n: u32) -> Self {
        CurrencyAmount::Whole(n as u64)
    }
}

impl From<f64> for CurrencyAmount {
    fn from(x: f64) -> Self {
        CurrencyAmount::Fractional(x)
    }
}

/// Currency name -> amount, e.g. `{"keys": 1, "metal": 1.55}`
///
/// Entries are kept exactly as given, zero amounts included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currencies(BTreeMap<String, CurrencyAmount>);

impl Currencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, currency: impl Into<String>, amount: impl Into<CurrencyAmount>) -> Self {
        self.insert(currency, amount);
        self
    }

    pub fn insert(&mut self, currency: impl Into<String>, amount: impl Into<CurrencyAmount>) {
        self.0.insert(currency.into(), amount.into());
    }

    pub fn get(&self, currency: &str) -> Option<CurrencyAmount> {
        self.0.get(currency).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First currency whose amount can't be sent
    fn non_finite(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, amount)| !amount.is_finite())
            .map(|(currency, _)| currency.as_str())
    }
}

impl<K: Into<String>, A: Into<CurrencyAmount>> FromIterator<(K, A)> for Currencies {
    fn from_iter<I: IntoIterator<Item = (K, A)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(currency, amount)| (currency.into(), amount.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality {
    pub id: u32,
}

/// Item description inside an outbound listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingItem {
    pub base_name: String,
    pub craftable: bool,
    pub tradable: bool,
    pub quality: Quality,
}

/// Request body for creating one listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPayload {
    pub item: ListingItem,
    pub buyout: bool,
    pub offers: bool,
    pub promoted: bool,
    pub details: String,
    pub currencies: Currencies,
    /// Asset id of the item being sold, absent for buy listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

/// One entry of a batch create request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSpec {
    pub sku: String,
    pub intent: String,
    pub currencies: Currencies,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub asset_id: u64,
}

impl ListingSpec {
    pub fn new(
        sku: impl Into<String>,
        intent: impl Into<String>,
        currencies: Currencies,
        details: impl Into<String>,
    ) -> Self {
        Self {
            sku: sku.into(),
            intent: intent.into(),
            currencies,
            details: details.into(),
            asset_id: 0,
        }
    }

    pub fn with_asset_id(mut self, asset_id: u64) -> Self {
        self.asset_id = asset_id;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAgent {
    pub client: String,
    #[serde(default)]
    pub last_pulse: i64,
}

/// Listing as returned by the API. Fields the client doesn't model are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub steamid: String,
    pub appid: u32,
    pub intent: ListingIntent,
    pub listed_at: i64,
    #[serde(default)]
    pub bumped_at: Option<i64>,
    #[serde(default)]
    pub currencies: Currencies,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub item: Value,
    #[serde(default)]
    pub user_agent: Option<UserAgent>,
    #[serde(default)]
    pub user: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listing {
    pub fn listed_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.listed_at, 0)
    }

    /// Trade offer URL of the listing owner, empty when the API didn't include one
    pub fn trade_offer_url(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|user| user.get("tradeOfferUrl"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

/// Builds listing payloads. Intent is validated before anything is resolved.
#[derive(Debug, Clone)]
pub struct ListingBuilder {
    resolver: ItemResolver,
}

impl ListingBuilder {
    pub fn new(resolver: ItemResolver) -> Self {
        Self { resolver }
    }

    pub fn build_item(&self, sku: &str) -> Result<ListingItem> {
        let identity = self.resolver.resolve(sku)?;
        Ok(ListingItem {
            base_name: identity.base_name,
            craftable: identity.craftable,
            tradable: true,
            quality: Quality {
                id: identity.quality,
            },
        })
    }

    pub fn build(
        &self,
        sku: &str,
        intent: &str,
        currencies: &Currencies,
        details: &str,
        asset_id: u64,
    ) -> Result<ListingPayload> {
        let intent = intent.parse::<ListingIntent>()?;
        self.build_validated(sku, intent, currencies, details, asset_id)
    }

    /// Build every entry or none. All intents are checked before the first SKU is resolved.
    pub fn build_batch(&self, specs: &[ListingSpec]) -> Result<Vec<ListingPayload>> {
        let intents = specs
            .iter()
            .map(|spec| spec.intent.parse::<ListingIntent>())
            .collect::<Result<Vec<_>>>()?;

        specs
            .iter()
            .zip(intents)
            .map(|(spec, intent)| {
                self.build_validated(
                    &spec.sku,
                    intent,
                    &spec.currencies,
                    &spec.details,
                    spec.asset_id,
                )
            })
            .collect()
    }

    fn build_validated(
        &self,
        sku: &str,
        intent: ListingIntent,
        currencies: &Currencies,
        details: &str,
        asset_id: u64,
    ) -> Result<ListingPayload> {
        if let Some(currency) = currencies.non_finite() {
            return Err(Error::InvalidAmount(currency.to_string()));
        }

        Ok(ListingPayload {
            item: self.build_item(sku)?,
            buyout: true,
            offers: true,
            promoted: false,
            details: details.to_string(),
            currencies: currencies.clone(),
            id: match intent {
                ListingIntent::Sell => Some(asset_id),
                ListingIntent::Buy => None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ItemResolver;
    use crate::schema::{ItemSchema, MapSchema};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn builder() -> ListingBuilder {
        let schema = MapSchema::from_entries([(263, "Ellis' Cap"), (378, "Team Captain")]);
        ListingBuilder::new(ItemResolver::new(Arc::new(schema)))
    }

    fn currencies() -> Currencies {
        Currencies::new().with("keys", 1u64).with("metal", 1.55)
    }

    #[test]
    fn test_build_item() {
        let item = builder().build_item("263;6").unwrap();
        assert_eq!(
            serde_json::to_value(item).unwrap(),
            json!({
                "baseName": "Ellis' Cap",
                "craftable": true,
                "quality": {"id": 6},
                "tradable": true,
            })
        );
    }

    #[test]
    fn test_build_sell_listing() {
        let payload = builder()
            .build("263;6", "sell", &currencies(), "my description", 13201231975)
            .unwrap();

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "buyout": true,
                "offers": true,
                "promoted": false,
                "item": {
                    "baseName": "Ellis' Cap",
                    "craftable": true,
                    "quality": {"id": 6},
                    "tradable": true,
                },
                "currencies": {"keys": 1, "metal": 1.55},
                "details": "my description",
                "id": 13201231975u64,
            })
        );
    }

    #[test]
    fn test_build_buy_listing_has_no_id() {
        let payload = builder()
            .build("263;6", "buy", &currencies(), "my description", 13201231975)
            .unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert!(value.get("id").is_none());
        assert_eq!(
            value,
            json!({
                "buyout": true,
                "offers": true,
                "promoted": false,
                "item": {
                    "baseName": "Ellis' Cap",
                    "craftable": true,
                    "quality": {"id": 6},
                    "tradable": true,
                },
                "currencies": {"keys": 1, "metal": 1.55},
                "details": "my description",
            })
        );
    }

    #[test]
    fn test_sell_without_asset_id_defaults_to_zero() {
        let payload = builder()
            .build("263;6", "sell", &currencies(), "", 0)
            .unwrap();
        assert_eq!(payload.id, Some(0));
    }

    #[test]
    fn test_zero_amounts_are_kept() {
        let currencies = Currencies::new().with("keys", 0u64).with("metal", 0.11);
        let payload = builder()
            .build("263;6", "buy", &currencies, "test", 0)
            .unwrap();
        assert_eq!(
            serde_json::to_value(&payload.currencies).unwrap(),
            json!({"keys": 0, "metal": 0.11})
        );
    }

    #[test]
    fn test_non_finite_amount_is_rejected() {
        let builder = builder();
        for amount in [f64::NAN, f64::INFINITY] {
            let currencies = Currencies::new().with("keys", 1u64).with("metal", amount);
            assert!(matches!(
                builder.build("263;6", "buy", &currencies, "", 0),
                Err(Error::InvalidAmount(ref currency)) if currency == "metal"
            ));
        }

        let specs = vec![
            ListingSpec::new("263;6", "buy", currencies(), ""),
            ListingSpec::new("263;6", "sell", Currencies::new().with("metal", f64::NAN), ""),
        ];
        assert!(matches!(
            builder.build_batch(&specs),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_build_is_pure() {
        let builder = builder();
        let first = builder.build("263;6", "sell", &currencies(), "x", 5).unwrap();
        let second = builder.build("263;6", "sell", &currencies(), "x", 5).unwrap();
        assert_eq!(first, second);
    }

    struct CountingSchema {
        lookups: AtomicUsize,
    }

    impl ItemSchema for CountingSchema {
        fn sku_to_base_name(&self, _sku: &str) -> Result<String> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok("Ellis' Cap".to_string())
        }
    }

    #[test]
    fn test_invalid_intent_fails_before_resolution() {
        let schema = Arc::new(CountingSchema {
            lookups: AtomicUsize::new(0),
        });
        let builder = ListingBuilder::new(ItemResolver::new(schema.clone()));

        for intent in ["other", "", "Buy", "SELL"] {
            let result = builder.build("263;6", intent, &currencies(), "x", 1);
            assert!(matches!(result, Err(Error::InvalidIntent(ref i)) if i == intent));
        }
        assert_eq!(schema.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_build_batch_preserves_order() {
        let specs = vec![
            ListingSpec::new("378;6", "buy", currencies(), "first"),
            ListingSpec::new("263;6", "sell", currencies(), "second").with_asset_id(42),
        ];

        let payloads = builder().build_batch(&specs).unwrap();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].item.base_name, "Team Captain");
        assert_eq!(payloads[0].id, None);
        assert_eq!(payloads[1].item.base_name, "Ellis' Cap");
        assert_eq!(payloads[1].id, Some(42));
    }

    #[test]
    fn test_build_batch_all_or_nothing() {
        let schema = Arc::new(CountingSchema {
            lookups: AtomicUsize::new(0),
        });
        let builder = ListingBuilder::new(ItemResolver::new(schema.clone()));
        let specs = vec![
            ListingSpec::new("263;6", "buy", currencies(), "ok"),
            ListingSpec::new("263;6", "trade", currencies(), "bad"),
        ];

        assert!(matches!(
            builder.build_batch(&specs),
            Err(Error::InvalidIntent(ref i)) if i == "trade"
        ));
        assert_eq!(schema.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_build_batch_resolution_failure() {
        let specs = vec![
            ListingSpec::new("263;6", "buy", currencies(), "ok"),
            ListingSpec::new("-100;6", "buy", currencies(), "unknown"),
        ];
        assert!(matches!(
            builder().build_batch(&specs),
            Err(Error::Resolution { .. })
        ));
    }

    #[test]
    fn test_listing_spec_deserialize_defaults() {
        let spec: ListingSpec = serde_json::from_value(json!({
            "sku": "263;6",
            "intent": "buy",
            "currencies": {"metal": 0.11},
        }))
        .unwrap();
        assert_eq!(spec.asset_id, 0);
        assert_eq!(spec.details, "");
        assert_eq!(spec.currencies.get("metal"), Some(CurrencyAmount::Fractional(0.11)));
    }

    #[test]
    fn test_deserialize_listing() {
        let listing: Listing = serde_json::from_value(json!({
            "id": "440_76561198253325712_9e89a4a85aae68266ec992c22b0d52e2",
            "steamid": "76561198253325712",
            "appid": 440,
            "currencies": {"metal": 0.11},
            "value": {"raw": 0.11, "short": "0.11 ref"},
            "details": "my test description",
            "listedAt": 1700000000,
            "bumpedAt": 1700000000,
            "intent": "buy",
            "count": 1,
            "status": "active",
            "item": {"baseName": "Ellis' Cap", "defindex": 263, "quality": {"id": 6, "name": "Unique"}},
            "userAgent": {"client": "Listing goin' up! | backpack-tf v0.2.0", "lastPulse": 1700000000},
            "user": {"id": "76561198253325712", "tradeOfferUrl": "https://steamcommunity.com/tradeoffer/new/?partner=1"}
        }))
        .unwrap();

        assert_eq!(listing.intent, ListingIntent::Buy);
        assert_eq!(listing.appid, 440);
        assert_eq!(listing.currencies, Currencies::new().with("metal", 0.11));
        assert_eq!(listing.item["defindex"], 263);
        assert_eq!(listing.user_agent.as_ref().unwrap().last_pulse, 1700000000);
        assert_eq!(
            listing.trade_offer_url(),
            "https://steamcommunity.com/tradeoffer/new/?partner=1"
        );
        assert_eq!(listing.extra["status"], "active");
        assert_eq!(listing.listed_at_utc().unwrap().timestamp(), 1700000000);
    }

    #[test]
    fn test_trade_offer_url_defaults_to_empty() {
        let listing: Listing = serde_json::from_value(json!({
            "id": "1",
            "steamid": "2",
            "appid": 440,
            "intent": "sell",
            "listedAt": 0,
        }))
        .unwrap();
        assert_eq!(listing.trade_offer_url(), "");
    }
}
