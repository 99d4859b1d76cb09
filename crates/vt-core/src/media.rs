//! Types exchanged with the media host.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A file received from a client, held in memory until handed to the
/// `MediaStore`.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            data,
        }
    }

    /// Lower-cased extension of the original file name, if any.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Resource class on the media host. Hosts keep images and videos in
/// separate namespaces, so deletes must name the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// What the media host reports back for a stored asset.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedAsset {
    /// Durable public URL.
    pub url: String,
    /// Host-side identifier used for deletion.
    pub public_id: String,
    /// Playback length in seconds, for video assets.
    pub duration: Option<f64>,
}

/// Derives the asset identifier from a stored URL: the last path segment
/// with its extension stripped.
///
/// `https://host/a/b/abc123.png` → `abc123`
pub fn asset_id_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    let id = match segment.split_once('.') {
        Some((stem, _)) => stem,
        None => segment,
    };
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_id_strips_path_and_extension() {
        assert_eq!(
            asset_id_from_url("https://res.example.com/demo/image/upload/v17/abc123.png"),
            Some("abc123")
        );
        assert_eq!(asset_id_from_url("/media/ab/cd/abcd99.webp?x=1"), Some("abcd99"));
        assert_eq!(asset_id_from_url("plainid"), Some("plainid"));
    }

    #[test]
    fn asset_id_rejects_empty() {
        assert_eq!(asset_id_from_url(""), None);
        assert_eq!(asset_id_from_url("https://host/.png"), None);
    }

    #[test]
    fn extension_is_lowercased() {
        let f = UploadFile::new("Clip.MP4", None, Bytes::from_static(b"x"));
        assert_eq!(f.extension().as_deref(), Some("mp4"));
        let f = UploadFile::new("noext", None, Bytes::new());
        assert_eq!(f.extension(), None);
        let f = UploadFile::new(".hidden", None, Bytes::new());
        assert_eq!(f.extension(), None);
    }
}
