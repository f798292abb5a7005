//! PNG export of the rendered card.
//!
//! [`Exporter::trigger`] snapshots the root currently published on its
//! [`RootHandle`], then rasterizes and delivers it on the tokio runtime. The
//! call itself never blocks and never fails:
//!
//! - no mounted root: nothing happens ([`ExportOutcome::Skipped`])
//! - rasterizer error: logged at `warn` and dropped, no file is delivered
//!   ([`ExportOutcome::Failed`]); the user sees nothing and may trigger again
//! - success: the data URI goes to the [`Downloader`]
//!
//! Each trigger owns its own `Arc` of the root, so repeated triggers run
//! independently and cannot observe each other.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::{BoxFuture, FutureExt};
use tokio::task::JoinHandle;

use crate::rendering::raster::rasterize;
use crate::rendering::{RenderedRoot, RootHandle};
use crate::{Error, GeneratorConfig, Result};

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Options passed through to the rasterizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Skip any cached image for an identical root
    pub cache_bust: bool,
    pub pixel_ratio: f32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            cache_bust: true,
            pixel_ratio: 1.0,
        }
    }
}

/// Turns a rendered root into a `data:image/png;base64,...` URI
pub trait Rasterizer: Send + Sync + 'static {
    fn render_node_to_image(
        &self,
        root: Arc<RenderedRoot>,
        options: RasterOptions,
    ) -> BoxFuture<'static, Result<String>>;
}

/// Delivers an image to the user. Fire-and-forget: failures stay inside.
pub trait Downloader: Send + Sync + 'static {
    fn trigger_download(&self, data_uri: &str, filename: &str);
}

pub fn png_data_uri(png: &[u8]) -> String {
    format!("{}{}", PNG_DATA_URI_PREFIX, STANDARD.encode(png))
}

/// Decode a base64 PNG data URI back to bytes.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let payload = uri
        .strip_prefix(PNG_DATA_URI_PREFIX)
        .ok_or_else(|| Error::Encoding("not a base64 PNG data URI".into()))?;
    STANDARD
        .decode(payload)
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// The built-in rasterizer backed by [`rasterize`]
///
/// Remembers the last image it produced, keyed by the root fingerprint and
/// pixel ratio. A request with `cache_bust` set always repaints.
#[derive(Debug, Clone, Default)]
pub struct PixmapRasterizer {
    last: Arc<Mutex<Option<(String, String)>>>,
}

impl PixmapRasterizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rasterizer for PixmapRasterizer {
    fn render_node_to_image(
        &self,
        root: Arc<RenderedRoot>,
        options: RasterOptions,
    ) -> BoxFuture<'static, Result<String>> {
        let last = self.last.clone();
        async move {
            let key = format!("{}@{}", root.fingerprint(), options.pixel_ratio);
            if !options.cache_bust {
                let cached = last.lock().ok().and_then(|g| g.as_ref().cloned());
                if let Some((k, uri)) = cached {
                    if k == key {
                        log::debug!("raster cache hit for {}", &key[..12]);
                        return Ok(uri);
                    }
                }
            }

            let shot = tokio::task::spawn_blocking(move || rasterize(&root, options.pixel_ratio))
                .await
                .map_err(|e| Error::Rasterization(format!("raster task failed: {}", e)))??;
            let uri = png_data_uri(&shot.png_data);
            if let Ok(mut g) = last.lock() {
                *g = Some((key, uri.clone()));
            }
            Ok(uri)
        }
        .boxed()
    }
}

/// Writes delivered images into a directory
#[derive(Debug, Clone)]
pub struct FileDownloader {
    dir: PathBuf,
}

impl FileDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Decode `data_uri` and write it to `filename` inside the directory.
    pub fn save(&self, data_uri: &str, filename: &str) -> Result<PathBuf> {
        let path = self.dir.join(filename);
        let write = || -> Result<()> {
            let bytes = decode_data_uri(data_uri)?;
            std::fs::create_dir_all(&self.dir)?;
            std::fs::write(&path, bytes)?;
            Ok(())
        };
        write().map_err(|e| Error::Delivery(format!("{}: {}", path.display(), e)))?;
        Ok(path)
    }
}

impl Downloader for FileDownloader {
    fn trigger_download(&self, data_uri: &str, filename: &str) {
        match self.save(data_uri, filename) {
            Ok(path) => log::info!("saved {}", path.display()),
            Err(e) => log::warn!("could not save {}: {}", filename, e),
        }
    }
}

/// A file captured by [`MemoryDownloader`]
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub filename: String,
    pub data_uri: String,
}

impl Download {
    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        decode_data_uri(&self.data_uri)
    }
}

/// Keeps delivered files in memory. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemoryDownloader {
    downloads: Arc<Mutex<Vec<Download>>>,
}

impl MemoryDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.lock().map(|g| g.to_vec()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.downloads.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Downloader for MemoryDownloader {
    fn trigger_download(&self, data_uri: &str, filename: &str) {
        if let Ok(mut g) = self.downloads.lock() {
            g.push(Download {
                filename: filename.to_string(),
                data_uri: data_uri.to_string(),
            });
        }
    }
}

/// How one export ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// No root was mounted; nothing was attempted
    Skipped,
    /// The image was handed to the downloader
    Delivered { filename: String },
    /// Rasterization failed; the error was logged and dropped
    Failed { reason: String },
}

enum TicketState {
    Ready(ExportOutcome),
    Pending(JoinHandle<ExportOutcome>),
}

/// Completion handle for one triggered export
///
/// Dropping the ticket does not cancel the export.
pub struct ExportTicket {
    state: TicketState,
}

impl ExportTicket {
    fn ready(outcome: ExportOutcome) -> Self {
        Self {
            state: TicketState::Ready(outcome),
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            TicketState::Ready(_) => true,
            TicketState::Pending(h) => h.is_finished(),
        }
    }

    pub async fn wait(self) -> ExportOutcome {
        match self.state {
            TicketState::Ready(outcome) => outcome,
            TicketState::Pending(handle) => handle.await.unwrap_or_else(|e| {
                log::warn!("export task aborted: {}", e);
                ExportOutcome::Failed {
                    reason: e.to_string(),
                }
            }),
        }
    }
}

/// Snapshots the published root and exports it as a PNG file
#[derive(Clone)]
pub struct Exporter {
    handle: RootHandle,
    rasterizer: Arc<dyn Rasterizer>,
    downloader: Arc<dyn Downloader>,
    filename: String,
    options: RasterOptions,
}

impl Exporter {
    pub fn new<R, D>(handle: RootHandle, rasterizer: R, downloader: D, config: &GeneratorConfig) -> Self
    where
        R: Rasterizer,
        D: Downloader,
    {
        Self {
            handle,
            rasterizer: Arc::new(rasterizer),
            downloader: Arc::new(downloader),
            filename: config.export_filename.clone(),
            options: RasterOptions {
                cache_bust: config.cache_bust,
                pixel_ratio: config.pixel_ratio,
            },
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The root that an export started now would capture.
    pub fn snapshot(&self) -> Result<Arc<RenderedRoot>> {
        self.handle.current().ok_or(Error::MissingRoot)
    }

    /// Start an export of the root mounted right now.
    ///
    /// Returns immediately. Must be called from within a tokio runtime for the
    /// export to run; outside one the export is reported as failed.
    pub fn trigger(&self) -> ExportTicket {
        let root = match self.snapshot() {
            Ok(root) => root,
            Err(e) => {
                log::debug!("export ignored: {}", e);
                return ExportTicket::ready(ExportOutcome::Skipped);
            }
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(rt) => rt,
            Err(e) => {
                log::warn!("export dropped: {}", e);
                return ExportTicket::ready(ExportOutcome::Failed {
                    reason: e.to_string(),
                });
            }
        };

        let rasterizer = self.rasterizer.clone();
        let downloader = self.downloader.clone();
        let filename = self.filename.clone();
        let options = self.options;

        let task = runtime.spawn(async move {
            match rasterizer.render_node_to_image(root, options).await {
                Ok(data_uri) => {
                    downloader.trigger_download(&data_uri, &filename);
                    log::info!("exported {} ({} bytes encoded)", filename, data_uri.len());
                    ExportOutcome::Delivered { filename }
                }
                Err(e) => {
                    log::warn!("export of {} failed: {}", filename, e);
                    ExportOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        });

        ExportTicket {
            state: TicketState::Pending(task),
        }
    }
}
