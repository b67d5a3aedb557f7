//! Asynchronous image loading for the preload queue

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use tokio::sync::mpsc;

use daybook_core::{Error, Result};

/// Decoded image shared between the cache and the view
pub type ImageHandle = Arc<DynamicImage>;

/// Source of decoded images for entry image references
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, reference: &str) -> Result<DynamicImage>;
}

/// One load issued by the preload queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub index: usize,
    pub key: String,
    pub reference: String,
    /// Queue generation at issue time; stale completions are dropped
    pub generation: u64,
}

/// Completion of a `LoadRequest`, delivered back to the event loop
#[derive(Debug)]
pub struct LoadOutcome {
    pub index: usize,
    pub key: String,
    pub generation: u64,
    pub result: std::result::Result<ImageHandle, String>,
}

/// Run `request` on the tokio runtime and send the outcome to `tx`
///
/// A dropped receiver (view torn down) is not an error; the result is
/// simply discarded.
pub fn spawn_load(
    loader: Arc<dyn ImageLoader>,
    request: LoadRequest,
    tx: mpsc::UnboundedSender<LoadOutcome>,
) {
    tokio::spawn(async move {
        let result = loader
            .load(&request.reference)
            .await
            .map(Arc::new)
            .map_err(|e| e.to_string());
        let _ = tx.send(LoadOutcome {
            index: request.index,
            key: request.key,
            generation: request.generation,
            result,
        });
    });
}

/// Loads local files relative to the images directory and http(s) URLs
pub struct DiskImageLoader {
    images_dir: PathBuf,
    client: reqwest::Client,
}

impl DiskImageLoader {
    pub fn new(images_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("daybook/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| Error::Other(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            images_dir: images_dir.into(),
            client,
        })
    }

    /// Resolve a non-URL reference against the images directory
    pub fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.images_dir.join(path)
        }
    }

    async fn fetch(&self, url: &url::Url) -> Result<bytes::Bytes> {
        let response = self
            .client
            .get(url.as_str())
            .header("Accept", "image/webp,image/png,image/jpeg,image/*;q=0.8")
            .send()
            .await
            .map_err(|e| load_error(url.as_str(), format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(load_error(url.as_str(), format!("HTTP {}", response.status())));
        }

        response
            .bytes()
            .await
            .map_err(|e| load_error(url.as_str(), format!("Read error: {}", e)))
    }
}

#[async_trait]
impl ImageLoader for DiskImageLoader {
    async fn load(&self, reference: &str) -> Result<DynamicImage> {
        let bytes: Vec<u8> = match parse_remote(reference) {
            Some(url) => self.fetch(&url).await?.to_vec(),
            None => {
                let path = self.resolve(reference);
                tokio::fs::read(&path)
                    .await
                    .map_err(|e| load_error(reference, format!("{}: {}", path.display(), e)))?
            }
        };

        // Decoding is CPU-bound
        let reference_owned = reference.to_string();
        tokio::task::spawn_blocking(move || decode_image_bytes(&bytes))
            .await
            .map_err(|e| load_error(&reference_owned, format!("Task failed: {}", e)))?
            .map_err(|e| load_error(&reference_owned, e))
    }
}

fn parse_remote(reference: &str) -> Option<url::Url> {
    url::Url::parse(reference)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

fn load_error(key: &str, message: String) -> Error {
    Error::ImageLoad {
        key: key.to_string(),
        message,
    }
}

/// Decode image bytes with format detection
pub fn decode_image_bytes(bytes: &[u8]) -> std::result::Result<DynamicImage, String> {
    if bytes.is_empty() {
        return Err("Empty data".to_string());
    }

    if let Ok(img) = image::load_from_memory(bytes) {
        return Ok(img);
    }

    // Fall back to magic bytes when guessing fails
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return image::load_from_memory_with_format(bytes, image::ImageFormat::WebP)
            .map_err(|e| format!("WebP: {}", e));
    }
    if bytes.starts_with(b"\xff\xd8\xff") {
        return image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)
            .map_err(|e| format!("JPEG: {}", e));
    }
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .map_err(|e| format!("PNG: {}", e));
    }

    Err(format!("Unknown format ({}B)", bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 2, image::Rgb([200, 10, 10])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let img = decode_image_bytes(&png_bytes()).unwrap();
        assert_eq!((img.width(), img.height()), (4, 2));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode_image_bytes(&[]).is_err());
        assert!(decode_image_bytes(b"definitely not an image").is_err());
    }

    #[test]
    fn test_parse_remote() {
        assert!(parse_remote("https://example.com/a.webp").is_some());
        assert!(parse_remote("2025-01-03.webp").is_none());
        assert!(parse_remote("file:///tmp/a.webp").is_none());
    }

    #[tokio::test]
    async fn test_disk_loader_reads_relative_reference() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), png_bytes()).unwrap();
        let loader = DiskImageLoader::new(dir.path()).unwrap();

        let img = loader.load("a.png").await.unwrap();
        assert_eq!(img.width(), 4);

        let missing = loader.load("missing.png").await;
        assert!(matches!(missing, Err(Error::ImageLoad { .. })));
    }

    #[tokio::test]
    async fn test_spawn_load_reports_outcome() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), png_bytes()).unwrap();
        let loader: Arc<dyn ImageLoader> = Arc::new(DiskImageLoader::new(dir.path()).unwrap());
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_load(
            loader,
            LoadRequest {
                index: 7,
                key: "2025-01-03".into(),
                reference: "a.png".into(),
                generation: 2,
            },
            tx,
        );

        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.index, 7);
        assert_eq!(outcome.generation, 2);
        assert!(outcome.result.is_ok());
    }
}
