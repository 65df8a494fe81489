//! Owned-NFT discovery and metadata resolution for the collection page.
//!
//! Token URIs come in two shapes: `data:` URIs with the JSON embedded
//! (usually base64) and remote URLs. Metadata is validated against an
//! explicit schema on ingest; missing optional fields fall back to
//! defaults instead of failing. A token whose metadata cannot be resolved
//! becomes a placeholder record so the rest of the gallery still renders.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ethers::types::Address;
use serde::Deserialize;

use crate::chain::error::ChainError;
use crate::log_warn;

/// Metadata document schema. Every field is optional on ingest.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NftMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// One gallery entry, fully resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftRecord {
    pub token_id: u64,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub contract_address: String,
    /// True when this entry is a placeholder for a resolution failure.
    pub load_failed: bool,
}

impl NftRecord {
    pub fn from_metadata(token_id: u64, contract_address: &str, meta: NftMetadata) -> Self {
        Self {
            token_id,
            name: meta
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("NFT #{}", token_id)),
            description: meta
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "No description available".to_string()),
            image_url: meta.image.unwrap_or_default(),
            contract_address: contract_address.to_string(),
            load_failed: false,
        }
    }

    /// Substitute shown when a token's metadata could not be resolved.
    pub fn placeholder(token_id: u64, contract_address: &str) -> Self {
        Self {
            token_id,
            name: format!("NFT #{} (Error)", token_id),
            description: "Error loading metadata".to_string(),
            image_url: String::new(),
            contract_address: contract_address.to_string(),
            load_failed: true,
        }
    }
}

/// Remote-fetch port; `data:` URIs never reach it.
#[allow(async_fn_in_trait)]
pub trait MetadataFetcher {
    async fn fetch_json(&self, uri: &str) -> Result<Vec<u8>, ChainError>;
}

/// The slice of the contract gateway the collection page needs.
#[allow(async_fn_in_trait)]
pub trait CollectionSource {
    async fn owned_token_ids(&self, owner: Address) -> Result<Vec<u64>, ChainError>;
    async fn token_uri(&self, token_id: u64) -> Result<String, ChainError>;
}

// Inherent methods win path resolution, so these delegate to the real
// gateway operations rather than recursing.
impl CollectionSource for crate::chain::contract::NftGateway {
    async fn owned_token_ids(&self, owner: Address) -> Result<Vec<u64>, ChainError> {
        crate::chain::contract::NftGateway::owned_token_ids(self, owner).await
    }

    async fn token_uri(&self, token_id: u64) -> Result<String, ChainError> {
        crate::chain::contract::NftGateway::token_uri(self, token_id).await
    }
}

/// Extract the JSON payload of a `data:` token URI. Plain (non-base64)
/// payloads carry percent-escapes for the characters a URI cannot.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, ChainError> {
    let body = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| ChainError::MetadataParse("malformed data: URI".to_string()))?;
    let (header, payload) = body;
    if header.ends_with(";base64") {
        BASE64
            .decode(payload)
            .map_err(|e| ChainError::MetadataParse(format!("bad base64 payload: {}", e)))
    } else {
        Ok(percent_decode(payload))
    }
}

/// Decode `%XX` escapes; malformed escapes pass through untouched.
fn percent_decode(payload: &str) -> Vec<u8> {
    let bytes = payload.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

/// Resolve a token URI into parsed metadata.
pub async fn resolve_metadata<F: MetadataFetcher>(
    fetcher: &F,
    uri: &str,
) -> Result<NftMetadata, ChainError> {
    let bytes = if uri.starts_with("data:") {
        decode_data_uri(uri)?
    } else {
        fetcher.fetch_json(uri).await?
    };
    serde_json::from_slice(&bytes)
        .map_err(|e| ChainError::MetadataParse(format!("{} ({})", e, uri)))
}

/// Build the gallery records for `owner`. Failures while resolving a single
/// token degrade to a placeholder; only the initial ownership query can fail
/// the whole load.
pub async fn load_collection<S, F>(
    source: &S,
    fetcher: &F,
    owner: Address,
    contract_address: &str,
) -> Result<Vec<NftRecord>, ChainError>
where
    S: CollectionSource,
    F: MetadataFetcher,
{
    let token_ids = source.owned_token_ids(owner).await?;
    let mut records = Vec::with_capacity(token_ids.len());
    for token_id in token_ids {
        let resolved = match source.token_uri(token_id).await {
            Ok(uri) => resolve_metadata(fetcher, &uri).await,
            Err(e) => Err(e),
        };
        match resolved {
            Ok(meta) => records.push(NftRecord::from_metadata(token_id, contract_address, meta)),
            Err(e) => {
                log_warn!("Error processing token {}: {}", token_id, e);
                records.push(NftRecord::placeholder(token_id, contract_address));
            }
        }
    }
    Ok(records)
}

/// reqwest-backed fetcher used by the app; also fetches gallery images.
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl HttpFetcher {
    pub async fn fetch_bytes(&self, uri: &str) -> Result<Vec<u8>, ChainError> {
        let response = self
            .http
            .get(uri)
            .send()
            .await
            .map_err(|e| ChainError::Fetch(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChainError::Fetch(format!("HTTP {} for {}", status, uri)));
        }
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| ChainError::Fetch(e.to_string()))
    }
}

impl MetadataFetcher for HttpFetcher {
    async fn fetch_json(&self, uri: &str) -> Result<Vec<u8>, ChainError> {
        self.fetch_bytes(uri).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapFetcher(HashMap<String, Vec<u8>>);

    impl MetadataFetcher for MapFetcher {
        async fn fetch_json(&self, uri: &str) -> Result<Vec<u8>, ChainError> {
            self.0
                .get(uri)
                .cloned()
                .ok_or_else(|| ChainError::Fetch(format!("HTTP 404 for {}", uri)))
        }
    }

    struct MapSource {
        ids: Vec<u64>,
        uris: HashMap<u64, String>,
    }

    impl CollectionSource for MapSource {
        async fn owned_token_ids(&self, _owner: Address) -> Result<Vec<u64>, ChainError> {
            Ok(self.ids.clone())
        }

        async fn token_uri(&self, token_id: u64) -> Result<String, ChainError> {
            self.uris
                .get(&token_id)
                .cloned()
                .ok_or(ChainError::TokenNotFound(token_id))
        }
    }

    fn no_fetch() -> MapFetcher {
        MapFetcher(HashMap::new())
    }

    #[tokio::test]
    async fn base64_data_uri_resolves_inline() {
        let doc = br#"{"name":"Inline","description":"embedded","image":"ipfs://img"}"#;
        let uri = format!("data:application/json;base64,{}", BASE64.encode(doc));
        let meta = resolve_metadata(&no_fetch(), &uri).await.unwrap();
        assert_eq!(meta.name.as_deref(), Some("Inline"));
        assert_eq!(meta.image.as_deref(), Some("ipfs://img"));
    }

    #[tokio::test]
    async fn plain_data_uri_resolves_inline() {
        let uri = r#"data:application/json,{"name":"Plain"}"#;
        let meta = resolve_metadata(&no_fetch(), uri).await.unwrap();
        assert_eq!(meta.name.as_deref(), Some("Plain"));
    }

    #[tokio::test]
    async fn percent_encoded_data_uri_resolves_inline() {
        let uri = "data:application/json,%7B%22name%22%3A%22Encoded%22%7D";
        let meta = resolve_metadata(&no_fetch(), uri).await.unwrap();
        assert_eq!(meta.name.as_deref(), Some("Encoded"));
    }

    #[test]
    fn percent_decode_leaves_malformed_escapes_alone() {
        assert_eq!(percent_decode("a%2Cb"), b"a,b");
        assert_eq!(percent_decode("100%"), b"100%");
        assert_eq!(percent_decode("%zz"), b"%zz");
    }

    #[tokio::test]
    async fn remote_fetch_failure_is_a_fetch_error_not_a_parse_error() {
        let err = resolve_metadata(&no_fetch(), "https://gw/missing.json")
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Fetch(_)));
    }

    #[tokio::test]
    async fn remote_uri_goes_through_the_fetcher() {
        let mut map = HashMap::new();
        map.insert(
            "https://gw/meta.json".to_string(),
            br#"{"name":"Remote"}"#.to_vec(),
        );
        let meta = resolve_metadata(&MapFetcher(map), "https://gw/meta.json")
            .await
            .unwrap();
        assert_eq!(meta.name.as_deref(), Some("Remote"));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let record = NftRecord::from_metadata(7, "0xc0ffee", NftMetadata::default());
        assert_eq!(record.name, "NFT #7");
        assert_eq!(record.description, "No description available");
        assert_eq!(record.image_url, "");
        assert!(!record.load_failed);
    }

    #[test]
    fn malformed_data_uri_is_a_parse_error() {
        assert!(decode_data_uri("data:application/json").is_err());
        assert!(decode_data_uri("data:application/json;base64,!!!").is_err());
    }

    #[tokio::test]
    async fn one_bad_token_does_not_hide_the_others() {
        let mut uris = HashMap::new();
        uris.insert(1, "https://gw/1.json".to_string());
        uris.insert(2, "https://gw/missing.json".to_string());
        uris.insert(3, r#"data:application/json,{"name":"Three"}"#.to_string());
        let source = MapSource {
            ids: vec![1, 2, 3],
            uris,
        };
        let mut map = HashMap::new();
        map.insert("https://gw/1.json".to_string(), br#"{"name":"One"}"#.to_vec());
        let fetcher = MapFetcher(map);

        let records = load_collection(&source, &fetcher, Address::zero(), "0xc0ffee")
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "One");
        assert!(records[1].load_failed);
        assert_eq!(records[1].name, "NFT #2 (Error)");
        assert_eq!(records[2].name, "Three");
    }

    #[tokio::test]
    async fn missing_token_uri_becomes_a_placeholder() {
        let source = MapSource {
            ids: vec![5],
            uris: HashMap::new(),
        };
        let records = load_collection(&source, &no_fetch(), Address::zero(), "0xc0ffee")
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].load_failed);
    }
}
