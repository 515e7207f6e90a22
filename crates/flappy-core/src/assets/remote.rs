//! Remote character catalog client.
//!
//! Every method degrades instead of failing: an empty list, a placeholder
//! detail, or no bytes. Failures never cross this boundary; expected ones
//! (see [`FlappyError::is_degradable`]) are logged at `warn`, the rest at
//! `error`.

use crate::config::{validate_asset_id, FlappyConfig, NetworkConfig};
use crate::error::{FlappyError, Result};
use crate::models::{CatalogItem, CharacterDetail};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, warn};

/// Source of catalog data. Implemented over HTTP and by test doubles.
pub trait RemoteCatalog: Send + Sync {
    /// First `limit` catalog entries, or an empty list when unavailable.
    fn fetch_list(&self, limit: usize) -> Vec<CatalogItem>;

    /// Details for one entry, or [`CharacterDetail::placeholder`] on failure.
    fn fetch_detail(&self, item: &CatalogItem) -> CharacterDetail;

    /// Raw sprite bytes for `id`, or `None` on failure.
    fn fetch_image_bytes(&self, id: &str) -> Option<Vec<u8>>;
}

/// Catalog list body: a flat array, or a paged object with `results`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Flat(Vec<FlatListing>),
    Paged { results: Vec<NamedResource> },
}

#[derive(Debug, Deserialize)]
struct FlatListing {
    id: serde_json::Value,
    name: String,
    sprite_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    #[serde(default)]
    types: Vec<TypeSlot>,
    #[serde(default)]
    height: f64,
    #[serde(default)]
    weight: f64,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    kind: NamedType,
}

#[derive(Debug, Deserialize)]
struct NamedType {
    name: String,
}

/// Blocking HTTP implementation of [`RemoteCatalog`].
pub struct HttpCatalogClient {
    client: Client,
    config: FlappyConfig,
}

impl HttpCatalogClient {
    /// Create a client with the timeout and endpoints from `config`.
    pub fn new(config: &FlappyConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| FlappyError::Config {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn get(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FlappyError::RemoteUnavailable {
                url: url.to_string(),
                message: format!("HTTP {}", status),
                status_code: Some(status.as_u16()),
            });
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get(url)?.bytes()?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn try_fetch_list(&self, limit: usize) -> Result<Vec<CatalogItem>> {
        let url = format!("{}?limit={}", self.config.list_url(), limit);
        debug!("Fetching character list from {}", url);
        let response: ListResponse = self.get_json(&url)?;
        let mut items = parse_list(response, &self.config);
        items.truncate(limit);
        Ok(items)
    }

    fn try_fetch_detail(&self, item: &CatalogItem) -> Result<CharacterDetail> {
        let response: DetailResponse = self.get_json(&item.detail_url)?;
        Ok(parse_detail(response))
    }

    fn try_fetch_image(&self, id: &str) -> Result<Vec<u8>> {
        validate_asset_id(id)?;
        let url = self.config.sprite_url(id);
        let bytes = self.get(&url)?.bytes()?;
        Ok(bytes.to_vec())
    }
}

impl RemoteCatalog for HttpCatalogClient {
    fn fetch_list(&self, limit: usize) -> Vec<CatalogItem> {
        match self.try_fetch_list(limit) {
            Ok(items) => items,
            Err(e) => {
                log_absorbed("Character list", &e);
                Vec::new()
            }
        }
    }

    fn fetch_detail(&self, item: &CatalogItem) -> CharacterDetail {
        match self.try_fetch_detail(item) {
            Ok(detail) => detail,
            Err(e) => {
                log_absorbed(&format!("Details for {}", item.id), &e);
                CharacterDetail::placeholder()
            }
        }
    }

    fn fetch_image_bytes(&self, id: &str) -> Option<Vec<u8>> {
        match self.try_fetch_image(id) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log_absorbed(&format!("Sprite {}", id), &e);
                None
            }
        }
    }
}

fn log_absorbed(what: &str, err: &FlappyError) {
    if err.is_degradable() {
        warn!("{} unavailable: {}", what, err);
    } else {
        error!("{} request rejected: {}", what, err);
    }
}

/// Turn a list body into catalog items, skipping entries without a usable id.
fn parse_list(response: ListResponse, config: &FlappyConfig) -> Vec<CatalogItem> {
    match response {
        ListResponse::Flat(listings) => listings
            .into_iter()
            .filter_map(|listing| {
                let id = match listing.id {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Number(n) => n.to_string(),
                    _ => return None,
                };
                validate_asset_id(&id).ok()?;
                Some(CatalogItem {
                    sprite_url: listing
                        .sprite_url
                        .unwrap_or_else(|| config.sprite_url(&id)),
                    detail_url: listing.url.unwrap_or_else(|| config.detail_url(&id)),
                    name: listing.name,
                    id,
                })
            })
            .collect(),
        ListResponse::Paged { results } => results
            .into_iter()
            .filter_map(|resource| {
                let id = id_from_url(&resource.url)?;
                validate_asset_id(&id).ok()?;
                Some(CatalogItem {
                    name: capitalize(&resource.name),
                    sprite_url: config.sprite_url(&id),
                    detail_url: resource.url,
                    id,
                })
            })
            .collect(),
    }
}

fn parse_detail(response: DetailResponse) -> CharacterDetail {
    let mut type_tags: Vec<String> = response.types.into_iter().map(|t| t.kind.name).collect();
    if type_tags.is_empty() {
        type_tags.push("Unknown".to_string());
    }
    // Source units are decimetres and hectograms.
    CharacterDetail {
        type_tags,
        height_m: (response.height / 10.0).max(0.0),
        weight_kg: (response.weight / 10.0).max(0.0),
    }
}

/// Last non-empty path segment of a resource URL.
fn id_from_url(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> FlappyConfig {
        FlappyConfig {
            catalog_base_url: "https://api.test/v2".to_string(),
            sprite_cdn_url: "https://cdn.test/sprites".to_string(),
            ..FlappyConfig::default()
        }
    }

    #[test]
    fn test_parse_paged_list() {
        let body = r#"{
            "count": 1302,
            "results": [
                {"name": "bulbasaur", "url": "https://api.test/v2/pokemon/1/"},
                {"name": "mr-mime", "url": "https://api.test/v2/pokemon/122/"}
            ]
        }"#;
        let response: ListResponse = serde_json::from_str(body).unwrap();
        let items = parse_list(response, &test_config());

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "1");
        assert_eq!(items[0].name, "Bulbasaur");
        assert_eq!(items[0].sprite_url, "https://cdn.test/sprites/1.png");
        assert_eq!(items[0].detail_url, "https://api.test/v2/pokemon/1/");
        assert_eq!(items[1].name, "Mr-mime");
    }

    #[test]
    fn test_parse_flat_list() {
        let body = r#"[
            {"id": 25, "name": "Pikachu", "sprite_url": "https://img.test/25.png"},
            {"id": "4", "name": "Charmander"},
            {"id": null, "name": "Broken"}
        ]"#;
        let response: ListResponse = serde_json::from_str(body).unwrap();
        let items = parse_list(response, &test_config());

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "25");
        assert_eq!(items[0].sprite_url, "https://img.test/25.png");
        assert_eq!(items[1].sprite_url, "https://cdn.test/sprites/4.png");
        assert_eq!(items[1].detail_url, "https://api.test/v2/pokemon/4");
    }

    #[test]
    fn test_parse_detail_converts_units() {
        let body = r#"{
            "height": 7,
            "weight": 69,
            "types": [
                {"slot": 1, "type": {"name": "grass", "url": "x"}},
                {"slot": 2, "type": {"name": "poison", "url": "y"}}
            ]
        }"#;
        let detail = parse_detail(serde_json::from_str(body).unwrap());
        assert_eq!(detail.type_tags, vec!["grass", "poison"]);
        assert!((detail.height_m - 0.7).abs() < 1e-9);
        assert!((detail.weight_kg - 6.9).abs() < 1e-9);
    }

    #[test]
    fn test_parse_detail_without_types() {
        let detail = parse_detail(serde_json::from_str("{}").unwrap());
        assert_eq!(detail, CharacterDetail::placeholder());
    }

    #[test]
    fn test_id_from_url() {
        assert_eq!(id_from_url("https://api.test/v2/pokemon/25/"), Some("25".into()));
        assert_eq!(id_from_url("https://api.test/v2/pokemon/25"), Some("25".into()));
        assert_eq!(id_from_url("not a url"), None);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("pikachu"), "Pikachu");
        assert_eq!(capitalize("PIKACHU"), "Pikachu");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_unreachable_catalog_degrades() {
        let config = FlappyConfig {
            catalog_base_url: "http://127.0.0.1:9".to_string(),
            sprite_cdn_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..FlappyConfig::default()
        };
        let client = HttpCatalogClient::new(&config).unwrap();
        let item = CatalogItem {
            id: "1".into(),
            name: "Bulbasaur".into(),
            sprite_url: config.sprite_url("1"),
            detail_url: config.detail_url("1"),
        };

        assert!(client.fetch_list(5).is_empty());
        assert_eq!(client.fetch_detail(&item), CharacterDetail::placeholder());
        assert!(client.fetch_image_bytes("1").is_none());
    }

    #[test]
    fn test_failures_are_classified() {
        let config = FlappyConfig {
            catalog_base_url: "http://127.0.0.1:9".to_string(),
            sprite_cdn_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..FlappyConfig::default()
        };
        let client = HttpCatalogClient::new(&config).unwrap();

        let offline = client.try_fetch_list(5).unwrap_err();
        assert!(matches!(offline, FlappyError::RemoteUnavailable { .. }));
        assert!(offline.is_degradable());

        let bad_id = client.try_fetch_image("../etc").unwrap_err();
        assert!(matches!(bad_id, FlappyError::Validation { .. }));
        assert!(!bad_id.is_degradable());
        assert!(client.fetch_image_bytes("../etc").is_none());
    }
}
