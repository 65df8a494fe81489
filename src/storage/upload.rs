//! Upload pipeline: push payloads to a content-addressed storage endpoint
//! and compose the two-step image-then-metadata publish.
//!
//! The endpoint speaks the Lighthouse/IPFS `add` protocol: a multipart POST
//! authorized by bearer token, answering with the content hash. The
//! returned URI points at the public gateway so wallets and marketplaces
//! can resolve it.

use serde::Deserialize;
use serde_json::json;

use crate::chain::error::ChainError;

/// Port for a single content-addressed upload. Implemented by the real
/// HTTP client below and by mocks in workflow tests.
#[allow(async_fn_in_trait)]
pub trait BlobStore {
    /// Upload `bytes` and return a resolvable content URI.
    async fn upload_blob(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<String, ChainError>;
}

/// Both URIs produced by a completed publish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedArtifact {
    pub image_uri: String,
    pub metadata_uri: String,
}

/// The ERC-721 metadata document body.
pub fn metadata_document(name: &str, description: &str, image_uri: &str) -> Vec<u8> {
    json!({
        "name": name,
        "description": description,
        "image": image_uri,
    })
    .to_string()
    .into_bytes()
}

/// Upload the image, then a metadata document referencing it. The order is
/// load-bearing: the metadata must point at an already-resolvable image.
pub async fn publish_artifact<S: BlobStore>(
    store: &S,
    image_png: Vec<u8>,
    name: &str,
    description: &str,
) -> Result<PublishedArtifact, ChainError> {
    let image_uri = store
        .upload_blob(image_png, "nft-image.png", "image/png")
        .await?;
    let metadata = metadata_document(name, description, &image_uri);
    let metadata_uri = store
        .upload_blob(metadata, "metadata.json", "application/json")
        .await?;
    Ok(PublishedArtifact {
        image_uri,
        metadata_uri,
    })
}

#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// HTTP client for the storage endpoint.
pub struct StorageClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    gateway_base: String,
}

impl StorageClient {
    pub fn new(api_url: String, api_key: String, gateway_base: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
            gateway_base,
        }
    }

    fn gateway_uri(&self, hash: &str) -> String {
        format!("{}/{}", self.gateway_base.trim_end_matches('/'), hash)
    }
}

impl BlobStore for StorageClient {
    async fn upload_blob(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<String, ChainError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime_type)
            .map_err(|e| ChainError::Upload(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ChainError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChainError::Upload(format!(
                "storage endpoint returned {}: {}",
                status, body
            )));
        }

        let parsed: AddResponse = response
            .json()
            .await
            .map_err(|e| ChainError::Upload(format!("unexpected upload response: {}", e)))?;
        Ok(self.gateway_uri(&parsed.hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingStore {
        uploads: RefCell<Vec<(String, String)>>,
    }

    impl BlobStore for RecordingStore {
        async fn upload_blob(
            &self,
            _bytes: Vec<u8>,
            filename: &str,
            mime_type: &str,
        ) -> Result<String, ChainError> {
            let mut uploads = self.uploads.borrow_mut();
            uploads.push((filename.to_string(), mime_type.to_string()));
            Ok(format!("ipfs://blob-{}", uploads.len()))
        }
    }

    #[tokio::test]
    async fn publish_uploads_image_before_metadata() {
        let store = RecordingStore {
            uploads: RefCell::new(Vec::new()),
        };
        let artifact = publish_artifact(&store, vec![1, 2, 3], "Doodle", "A doodle")
            .await
            .unwrap();

        let uploads = store.uploads.borrow();
        assert_eq!(uploads[0], ("nft-image.png".into(), "image/png".into()));
        assert_eq!(uploads[1], ("metadata.json".into(), "application/json".into()));
        assert_eq!(artifact.image_uri, "ipfs://blob-1");
        assert_eq!(artifact.metadata_uri, "ipfs://blob-2");
    }

    #[tokio::test]
    async fn metadata_references_the_uploaded_image() {
        struct CapturingStore {
            bodies: RefCell<Vec<Vec<u8>>>,
        }
        impl BlobStore for CapturingStore {
            async fn upload_blob(
                &self,
                bytes: Vec<u8>,
                _filename: &str,
                _mime_type: &str,
            ) -> Result<String, ChainError> {
                self.bodies.borrow_mut().push(bytes);
                Ok("ipfs://X".to_string())
            }
        }

        let store = CapturingStore {
            bodies: RefCell::new(Vec::new()),
        };
        publish_artifact(&store, vec![0u8; 8], "Name", "Desc")
            .await
            .unwrap();

        let bodies = store.bodies.borrow();
        let doc: serde_json::Value = serde_json::from_slice(&bodies[1]).unwrap();
        assert_eq!(doc["name"], "Name");
        assert_eq!(doc["description"], "Desc");
        assert_eq!(doc["image"], "ipfs://X");
    }

    #[tokio::test]
    async fn upload_failure_aborts_before_metadata() {
        struct FailingStore;
        impl BlobStore for FailingStore {
            async fn upload_blob(
                &self,
                _bytes: Vec<u8>,
                _filename: &str,
                _mime_type: &str,
            ) -> Result<String, ChainError> {
                Err(ChainError::Upload("503 from storage".into()))
            }
        }

        let err = publish_artifact(&FailingStore, vec![], "n", "d")
            .await
            .unwrap_err();
        // The message must survive verbatim for the UI toast.
        assert!(err.to_string().contains("503 from storage"));
    }

    #[test]
    fn gateway_uri_joins_without_double_slash() {
        let client = StorageClient::new(
            "https://node.example/api/v0/add".into(),
            "key".into(),
            "https://gateway.example/ipfs/".into(),
        );
        assert_eq!(client.gateway_uri("QmAbc"), "https://gateway.example/ipfs/QmAbc");
    }
}
