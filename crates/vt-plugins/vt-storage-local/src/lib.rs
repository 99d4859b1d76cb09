//! # vt-storage-local
//! Local filesystem implementation of `MediaStore`.
//! Files land under `<root>/<kind>/<ab>/<cd>/<id>.<ext>` and are served
//! from the same relative path beneath `url_prefix`.

use std::path::PathBuf;

use anyhow::{bail, Context};
use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;
use vt_core::{MediaKind, MediaStore, UploadFile, UploadedAsset};

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./data/media")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/media")
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root_path: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root_path
    }

    /// Directory holding `id`: "<kind>/ab/cd"
    fn shard_dir(&self, id: &str, kind: MediaKind) -> PathBuf {
        let mut path = self.root_path.clone();
        path.push(kind.as_str());
        path.push(&id[0..2]);
        path.push(&id[2..4]);
        path
    }
}

/// Ids are 32 lowercase hex characters; anything else never names a file
/// this store wrote.
fn is_asset_id(id: &str) -> bool {
    id.len() == 32 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn extension_for(file: &UploadFile) -> Option<String> {
    file.extension().or_else(|| {
        let content_type = file.content_type.as_deref()?;
        mime_guess::get_mime_extensions_str(content_type)
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
    })
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    /// Saves an upload under a fresh random id. Two uploads of the same bytes
    /// get distinct files, so deleting one never affects the other.
    async fn upload(&self, file: UploadFile, kind: MediaKind) -> anyhow::Result<UploadedAsset> {
        if file.data.is_empty() {
            bail!("refusing to store empty upload {}", file.file_name);
        }

        let id = Uuid::new_v4().simple().to_string();
        let file_name = match extension_for(&file) {
            Some(ext) => format!("{id}.{ext}"),
            None => id.clone(),
        };

        let dir = self.shard_dir(&id, kind);
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
        let target = dir.join(&file_name);
        fs::write(&target, &file.data)
            .await
            .with_context(|| format!("writing {}", target.display()))?;

        tracing::debug!(path = %target.display(), bytes = file.data.len(), "media stored");

        Ok(UploadedAsset {
            url: format!(
                "{}/{}/{}/{}/{}",
                self.url_prefix,
                kind.as_str(),
                &id[0..2],
                &id[2..4],
                file_name
            ),
            public_id: id,
            duration: None,
        })
    }

    async fn delete(&self, asset_id: &str, kind: MediaKind) -> anyhow::Result<()> {
        if !is_asset_id(asset_id) {
            bail!("not a local asset id: {asset_id}");
        }

        let dir = self.shard_dir(asset_id, kind);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => bail!("asset {asset_id} not found"),
            Err(e) => return Err(e.into()),
        };

        let mut removed = false;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let stem = name.split_once('.').map_or(name.as_ref(), |(stem, _)| stem);
            if stem == asset_id {
                fs::remove_file(entry.path()).await?;
                removed = true;
            }
        }

        if !removed {
            bail!("asset {asset_id} not found");
        }
        Ok(())
    }
}
