use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

use crate::display::{DisplayHandle, DisplayProxy, DisplaySurface};
use crate::error::{Error, Result};
use crate::render::{Page, Renderer};
use crate::translate::Translator;

/// Runs translations off the UI thread and hands results back to the display.
pub struct Orchestrator<T, R> {
    translator: Arc<T>,
    renderer: Arc<R>,
    // Shared by every worker so pooled HTTP connections outlive a single call.
    runtime: Arc<Runtime>,
}

impl<T: Translator, R: Renderer> Orchestrator<T, R> {
    pub fn new(translator: T, renderer: R) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("translation-io")
            .enable_all()
            .build()
            .map_err(Error::Worker)?;
        Ok(Self {
            translator: Arc::new(translator),
            renderer: Arc::new(renderer),
            runtime: Arc::new(runtime),
        })
    }

    /// Must be called on the UI thread. Shows the loading page before
    /// returning, then translates on a worker thread. The returned handle may
    /// be dropped to detach the worker.
    pub fn run_translation<S: DisplaySurface>(
        &self,
        target: String,
        display: &DisplayHandle<S>,
    ) -> Result<JoinHandle<()>> {
        let placeholder = self.renderer.render(&Page::loading(&target))?;
        display.navigate(placeholder.url())?;
        drop(placeholder);

        info!(chars = target.chars().count(), "translation started");
        let proxy = display.proxy();
        let translator = Arc::clone(&self.translator);
        let renderer = Arc::clone(&self.renderer);
        let runtime = Arc::clone(&self.runtime);

        thread::Builder::new()
            .name("translation".to_string())
            .spawn(move || {
                let outcome = runtime.block_on(translator.translate(&target));
                deliver(outcome, target, &proxy, renderer);
            })
            .map_err(Error::Worker)
    }
}

fn deliver<S: DisplaySurface, R: Renderer>(
    outcome: Result<String>,
    target: String,
    proxy: &DisplayProxy<S>,
    renderer: Arc<R>,
) {
    if !proxy.is_alive() {
        debug!("display closed before translation finished; result discarded");
        return;
    }

    let page = match &outcome {
        Ok(translated) => {
            info!(chars = translated.chars().count(), "translation finished");
            Page::translated(&target, translated)
        }
        Err(e) => {
            warn!(error = %e, "translation failed");
            Page::failed(&target, e)
        }
    };

    let queued = proxy.dispatch(move |surface: &S| {
        let shown = renderer
            .render(&page)
            .map_err(Error::from)
            .and_then(|rendered| surface.navigate(rendered.url()));
        if let Err(e) = shown {
            error!(error = %e, "failed to show translation");
        }
    });
    if !queued {
        debug!("display closed before result could be queued; result discarded");
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use crossbeam_channel::{unbounded, Receiver, Sender};

    use super::*;
    use crate::display::testing::RecordingSurface;
    use crate::error::DecodeError;
    use crate::render::{JsonPageRenderer, PageBody};

    /// Blocks inside `translate` until released by the test.
    struct GatedTranslator {
        started: Sender<()>,
        release: Receiver<()>,
        reply: Option<&'static str>,
    }

    #[async_trait]
    impl Translator for GatedTranslator {
        async fn translate(&self, _text: &str) -> Result<String> {
            let _ = self.started.send(());
            let _ = self.release.recv();
            match self.reply {
                Some(text) => Ok(text.to_string()),
                None => Err(DecodeError::NoChoices.into()),
            }
        }
    }

    struct Harness {
        orchestrator: Orchestrator<GatedTranslator, JsonPageRenderer>,
        started: Receiver<()>,
        release: Sender<()>,
        _dir: tempfile::TempDir,
    }

    fn harness(reply: Option<&'static str>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let (started_tx, started_rx) = unbounded();
        let (release_tx, release_rx) = unbounded();
        let translator = GatedTranslator { started: started_tx, release: release_rx, reply };
        Harness {
            orchestrator: Orchestrator::new(translator, JsonPageRenderer::in_dir(dir.path())).unwrap(),
            started: started_rx,
            release: release_tx,
            _dir: dir,
        }
    }

    #[test]
    fn loading_page_is_shown_before_the_request() {
        let h = harness(Some("こんにちは"));
        let display = DisplayHandle::new(RecordingSurface::default());

        let worker = h.orchestrator.run_translation("Hello".to_string(), &display).unwrap();
        h.started.recv().unwrap();

        assert_eq!(display.surface().pages(), vec![Page::loading("Hello")]);

        h.release.send(()).unwrap();
        worker.join().unwrap();
    }

    #[test]
    fn translation_is_delivered_on_the_ui_thread() {
        let h = harness(Some("こんにちは"));
        let display = DisplayHandle::new(RecordingSurface::default());

        let worker = h.orchestrator.run_translation("Hello".to_string(), &display).unwrap();
        h.release.send(()).unwrap();
        worker.join().unwrap();

        // Nothing reaches the surface until the UI thread runs the queue.
        assert_eq!(display.surface().navigations(), 1);
        display.surface().pump();

        let pages = display.surface().pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1], Page::translated("Hello", "こんにちは"));
    }

    #[test]
    fn workers_share_the_orchestrator_runtime() {
        let h = harness(Some("こんにちは"));
        let display = DisplayHandle::new(RecordingSurface::default());

        for target in ["one", "two"] {
            let worker = h.orchestrator.run_translation(target.to_string(), &display).unwrap();
            h.release.send(()).unwrap();
            worker.join().unwrap();
        }
        display.surface().pump();

        let pages = display.surface().pages();
        assert_eq!(pages.len(), 4);
        assert!(pages.contains(&Page::translated("one", "こんにちは")));
        assert!(pages.contains(&Page::translated("two", "こんにちは")));
    }

    #[test]
    fn failure_is_rendered_in_place_of_the_translation() {
        let h = harness(None);
        let display = DisplayHandle::new(RecordingSurface::default());

        let worker = h.orchestrator.run_translation("Hello".to_string(), &display).unwrap();
        h.release.send(()).unwrap();
        worker.join().unwrap();
        display.surface().pump();

        let pages = display.surface().pages();
        match &pages[1].body {
            PageBody::Failed(message) => assert!(message.contains("no choices"), "{message}"),
            other => panic!("expected failure page, got {other:?}"),
        }
    }

    #[test]
    fn destroy_before_completion_suppresses_every_surface_call() {
        let h = harness(Some("こんにちは"));
        let display = DisplayHandle::new(RecordingSurface::default());

        let worker = h.orchestrator.run_translation("Hello".to_string(), &display).unwrap();
        display.destroy();
        h.release.send(()).unwrap();
        worker.join().unwrap();
        display.surface().pump();

        assert_eq!(display.surface().navigations(), 1);
        assert_eq!(display.surface().dispatched(), 0);
        assert_eq!(display.surface().destroyed(), 1);
    }

    #[test]
    fn destroy_between_dispatch_and_ui_turn_suppresses_render() {
        let h = harness(Some("こんにちは"));
        let display = DisplayHandle::new(RecordingSurface::default());

        let worker = h.orchestrator.run_translation("Hello".to_string(), &display).unwrap();
        h.release.send(()).unwrap();
        worker.join().unwrap();
        assert_eq!(display.surface().dispatched(), 1);

        display.destroy();
        display.surface().pump();

        assert_eq!(display.surface().navigations(), 1);
    }

    #[test]
    fn rendered_pages_are_removed_after_display() {
        let h = harness(Some("こんにちは"));
        let display = DisplayHandle::new(RecordingSurface::default());

        let worker = h.orchestrator.run_translation("Hello".to_string(), &display).unwrap();
        h.release.send(()).unwrap();
        worker.join().unwrap();
        display.surface().pump();

        let paths = display.surface().paths();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| !p.exists()));
    }

    #[test]
    fn destroyed_display_rejects_a_new_translation() {
        let h = harness(Some("こんにちは"));
        let display = DisplayHandle::new(RecordingSurface::default());
        display.destroy();

        let err = h.orchestrator.run_translation("Hello".to_string(), &display).unwrap_err();
        assert!(matches!(err, Error::Lifecycle));
        assert!(h.started.try_recv().is_err());
    }
}
