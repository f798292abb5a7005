//! Export contract: skipped without a root, swallowed failures, independent
//! repeated exports.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::{join_all, BoxFuture, FutureExt};

use art_prompt::export::{
    ExportOutcome, Exporter, FileDownloader, MemoryDownloader, PixmapRasterizer, RasterOptions,
    Rasterizer,
};
use art_prompt::rendering::{Preview, RenderedRoot, RootHandle};
use art_prompt::state::{FieldEdit, FormStore};
use art_prompt::{Error, GeneratorConfig, Result};

/// Rejects every root, like a capture blocked by cross-origin content.
struct RejectingRasterizer {
    calls: Arc<AtomicUsize>,
}

impl Rasterizer for RejectingRasterizer {
    fn render_node_to_image(
        &self,
        _root: Arc<RenderedRoot>,
        _options: RasterOptions,
    ) -> BoxFuture<'static, Result<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async { Err(Error::Rasterization("tainted canvas".into())) }.boxed()
    }
}

/// Echoes the root's number so tests can see which snapshot was taken.
struct NumberRasterizer;

impl Rasterizer for NumberRasterizer {
    fn render_node_to_image(
        &self,
        root: Arc<RenderedRoot>,
        _options: RasterOptions,
    ) -> BoxFuture<'static, Result<String>> {
        async move {
            tokio::task::yield_now().await;
            let number = root
                .find(art_prompt::rendering::NodeKind::Number)
                .map(|n| n.lines[0].text.clone())
                .unwrap_or_default();
            Ok(format!("number:{}", number))
        }
        .boxed()
    }
}

fn mounted() -> (FormStore, Preview) {
    let mut store = FormStore::default();
    let preview = Preview::new(&GeneratorConfig::default());
    preview.mount(&mut store);
    (store, preview)
}

#[tokio::test]
async fn unset_handle_is_a_noop() {
    let downloads = MemoryDownloader::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let exporter = Exporter::new(
        RootHandle::unset(),
        RejectingRasterizer { calls: calls.clone() },
        downloads.clone(),
        &GeneratorConfig::default(),
    );
    let outcome = exporter.trigger().wait().await;
    assert_eq!(outcome, ExportOutcome::Skipped);
    assert!(downloads.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rasterization_failure_is_swallowed() {
    let (_store, preview) = mounted();
    let downloads = MemoryDownloader::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let exporter = Exporter::new(
        preview.handle(),
        RejectingRasterizer { calls: calls.clone() },
        downloads.clone(),
        &GeneratorConfig::default(),
    );
    let outcome = exporter.trigger().wait().await;
    assert!(matches!(outcome, ExportOutcome::Failed { .. }));
    assert!(downloads.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1, "no retries");

    // The user can simply try again.
    let again = exporter.trigger().wait().await;
    assert!(matches!(again, ExportOutcome::Failed { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rapid_triggers_deliver_independently() {
    let (_store, preview) = mounted();
    let downloads = MemoryDownloader::new();
    let exporter = Exporter::new(
        preview.handle(),
        PixmapRasterizer::new(),
        downloads.clone(),
        &GeneratorConfig::default(),
    );
    let outcomes = join_all([exporter.trigger().wait(), exporter.trigger().wait()]).await;
    for outcome in outcomes {
        assert_eq!(
            outcome,
            ExportOutcome::Delivered {
                filename: "art-prompt.png".into()
            }
        );
    }
    let got = downloads.downloads();
    assert_eq!(got.len(), 2);
    assert_eq!(got[0], got[1]);
    let png = got[0].png_bytes().unwrap();
    assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn each_trigger_snapshots_the_root_at_call_time() {
    let (mut store, preview) = mounted();
    let downloads = MemoryDownloader::new();
    let exporter = Exporter::new(
        preview.handle(),
        NumberRasterizer,
        downloads.clone(),
        &GeneratorConfig::default(),
    );
    let first = exporter.trigger();
    store.apply(FieldEdit::Number("2".into()));
    let second = exporter.trigger();
    first.wait().await;
    second.wait().await;

    let mut uris: Vec<String> = downloads.downloads().into_iter().map(|d| d.data_uri).collect();
    uris.sort();
    assert_eq!(uris, vec!["number:001", "number:2"]);
}

#[tokio::test]
async fn file_downloader_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let (_store, preview) = mounted();
    let cfg = GeneratorConfig {
        pixel_ratio: 2.0,
        ..Default::default()
    };
    let exporter = Exporter::new(
        preview.handle(),
        PixmapRasterizer::new(),
        FileDownloader::new(dir.path()),
        &cfg,
    );
    exporter.trigger().wait().await;

    let bytes = std::fs::read(dir.path().join("art-prompt.png")).unwrap();
    let decoder = png::Decoder::new(&bytes[..]);
    let reader = decoder.read_info().unwrap();
    assert_eq!(reader.info().width, 960);
    assert_eq!(reader.info().height, 960);
}

#[tokio::test]
async fn filename_is_constant_across_edits() {
    let (mut store, preview) = mounted();
    let downloads = MemoryDownloader::new();
    let exporter = Exporter::new(
        preview.handle(),
        NumberRasterizer,
        downloads.clone(),
        &GeneratorConfig::default(),
    );
    store.apply(FieldEdit::Title("Something else".into()));
    exporter.trigger().wait().await;
    assert_eq!(exporter.filename(), "art-prompt.png");
    assert_eq!(downloads.downloads()[0].filename, "art-prompt.png");
}
