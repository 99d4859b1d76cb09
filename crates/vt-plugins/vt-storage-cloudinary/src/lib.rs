//! # vt-storage-cloudinary
//!
//! `MediaStore` backed by a Cloudinary-compatible asset host. Every call is a
//! signed form POST: the signature is the SHA-256 hex digest of the sorted
//! `key=value` parameters joined by `&`, followed by the API secret.

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use vt_core::{MediaKind, MediaStore, UploadFile, UploadedAsset};

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

pub struct CloudinaryMediaStore {
    client: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryMediaStore {
    pub fn new(cloud_name: String, api_key: String, api_secret: SecretString) -> Self {
        Self::with_api_base(DEFAULT_API_BASE, cloud_name, api_key, api_secret)
    }

    pub fn with_api_base(
        api_base: impl Into<String>,
        cloud_name: String,
        api_key: String,
        api_secret: SecretString,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            cloud_name,
            api_key,
            api_secret,
        }
    }

    fn endpoint(&self, kind: MediaKind, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.api_base,
            self.cloud_name,
            kind.as_str(),
            action
        )
    }

    fn signed_form(&self, mut params: Vec<(&'static str, String)>) -> Form {
        params.push(("timestamp", chrono::Utc::now().timestamp().to_string()));
        let signature = sign(&params, self.api_secret.expose_secret());

        let mut form = Form::new()
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key, value);
        }
        form
    }

    async fn post<T: for<'de> Deserialize<'de>>(&self, url: String, form: Form) -> anyhow::Result<T> {
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| status.to_string());
            bail!("media host rejected request ({status}): {message}");
        }
        Ok(response.json::<T>().await?)
    }
}

/// SHA-256 request signature over the parameters sorted by key.
pub fn sign(params: &[(&str, String)], secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn into_asset(response: UploadResponse) -> UploadedAsset {
    UploadedAsset {
        url: response.secure_url,
        public_id: response.public_id,
        duration: response.duration,
    }
}

fn check_destroyed(asset_id: &str, response: DestroyResponse) -> anyhow::Result<()> {
    if response.result == "ok" {
        Ok(())
    } else {
        Err(anyhow!("destroy {asset_id}: {}", response.result))
    }
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload(&self, file: UploadFile, kind: MediaKind) -> anyhow::Result<UploadedAsset> {
        let mut part = Part::bytes(file.data.to_vec()).file_name(file.file_name.clone());
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }
        let form = self.signed_form(Vec::new()).part("file", part);

        let response: UploadResponse = self.post(self.endpoint(kind, "upload"), form).await?;
        tracing::debug!(public_id = %response.public_id, kind = kind.as_str(), "media uploaded");
        Ok(into_asset(response))
    }

    async fn delete(&self, asset_id: &str, kind: MediaKind) -> anyhow::Result<()> {
        let form = self.signed_form(vec![("public_id", asset_id.to_string())]);
        let response: DestroyResponse = self.post(self.endpoint(kind, "destroy"), form).await?;
        check_destroyed(asset_id, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_sorts_params_and_appends_secret() {
        let params = [
            ("timestamp", "1315060510".to_string()),
            ("public_id", "sample".to_string()),
        ];
        assert_eq!(
            sign(&params, "abcd"),
            "0d4fe14b2b4a3f68a97ccc5097c43908b623d24293c296826a9390c14d891509"
        );
        assert_eq!(
            sign(&[("timestamp", "1700000000".to_string())], "s3cr3t"),
            "fe7a29a535fc65aadbec02755c08fd66fc87e4f137f7fbced1af7cde0548fff4"
        );
    }

    #[test]
    fn endpoints_are_namespaced_by_kind() {
        let store = CloudinaryMediaStore::with_api_base(
            "http://localhost:9000/",
            "demo".into(),
            "key".into(),
            SecretString::from("secret"),
        );
        assert_eq!(
            store.endpoint(MediaKind::Video, "upload"),
            "http://localhost:9000/v1_1/demo/video/upload"
        );
        assert_eq!(
            store.endpoint(MediaKind::Image, "destroy"),
            "http://localhost:9000/v1_1/demo/image/destroy"
        );
    }

    #[test]
    fn upload_response_maps_duration() {
        let body = r#"{"secure_url":"https://res.test/demo/video/upload/v1/abc.mp4","public_id":"abc","duration":12.5,"bytes":42}"#;
        let asset = into_asset(serde_json::from_str(body).unwrap());
        assert_eq!(asset.public_id, "abc");
        assert_eq!(asset.duration, Some(12.5));

        let image = r#"{"secure_url":"https://res.test/x.png","public_id":"x"}"#;
        assert_eq!(into_asset(serde_json::from_str(image).unwrap()).duration, None);
    }

    #[test]
    fn destroy_requires_ok() {
        assert!(check_destroyed("a", DestroyResponse { result: "ok".into() }).is_ok());
        let err = check_destroyed("a", DestroyResponse { result: "not found".into() }).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
