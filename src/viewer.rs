use std::fs;
use std::sync::{Mutex, PoisonError};

use crossbeam_channel::{unbounded, Receiver, Sender};
use once_cell::sync::OnceCell;
use tracing::{debug, error, info};
use url::Url;

use crate::config::WindowConfig;
use crate::display::{DisplayHandle, DisplaySurface, UiTask};
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use crate::render::{Page, PageBody, Renderer};
use crate::translate::Translator;

const CJK_FONT_CANDIDATES: &[&str] = &[
    r"C:\Windows\Fonts\YuGothM.ttc",
    r"C:\Windows\Fonts\meiryo.ttc",
    r"C:\Windows\Fonts\msgothic.ttc",
    "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
];

/// Display surface backed by an egui window. Tasks queue on a channel that
/// the frame loop drains, so they always run on the UI thread.
pub struct EguiSurface {
    tasks: Sender<UiTask<EguiSurface>>,
    ctx: OnceCell<egui::Context>,
    page: Mutex<Option<Page>>,
}

impl EguiSurface {
    pub fn new() -> (Self, Receiver<UiTask<EguiSurface>>) {
        let (tx, rx) = unbounded();
        let surface = Self { tasks: tx, ctx: OnceCell::new(), page: Mutex::new(None) };
        (surface, rx)
    }

    fn attach(&self, ctx: egui::Context) {
        let _ = self.ctx.set(ctx);
    }

    fn repaint(&self) {
        if let Some(ctx) = self.ctx.get() {
            ctx.request_repaint();
        }
    }

    fn current_page(&self) -> Option<Page> {
        self.page.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl DisplaySurface for EguiSurface {
    fn navigate(&self, url: &Url) -> Result<()> {
        let page = Page::load(url)?;
        debug!(%url, "navigated");
        *self.page.lock().unwrap_or_else(PoisonError::into_inner) = Some(page);
        self.repaint();
        Ok(())
    }

    fn dispatch(&self, task: UiTask<Self>) {
        // Wake the frame loop so the task runs without waiting for input.
        if self.tasks.send(task).is_ok() {
            self.repaint();
        }
    }

    fn destroy(&self) {
        if let Some(ctx) = self.ctx.get() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

struct ViewerApp {
    display: DisplayHandle<EguiSurface>,
    tasks: Receiver<UiTask<EguiSurface>>,
    fonts_set: bool,
}

impl ViewerApp {
    fn close_intent(ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            i.key_pressed(egui::Key::Escape)
                || i.key_pressed(egui::Key::Enter)
                || i.key_pressed(egui::Key::Space)
                || i.viewport().close_requested()
        })
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.fonts_set {
            self.fonts_set = true;
            install_cjk_font(ctx);
        }

        while let Ok(task) = self.tasks.try_recv() {
            task(self.display.surface());
        }

        if !self.display.is_alive() {
            return;
        }
        if Self::close_intent(ctx) {
            self.display.request_close();
            return;
        }

        let Some(page) = self.display.surface().current_page() else {
            return;
        };

        egui::TopBottomPanel::top("target").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.label(egui::RichText::new(&page.target).weak());
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match &page.body {
                    PageBody::Loading => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("翻訳中です。しばらくお待ちください…");
                        });
                    }
                    PageBody::Translated(text) => {
                        ui.label(egui::RichText::new(text).size(18.0));
                    }
                    PageBody::Failed(message) => {
                        ui.label(egui::RichText::new(message).color(egui::Color32::LIGHT_RED));
                    }
                });
        });
    }
}

fn install_cjk_font(ctx: &egui::Context) {
    let Some((path, bytes)) = CJK_FONT_CANDIDATES
        .iter()
        .find_map(|path| fs::read(path).ok().map(|bytes| (*path, bytes)))
    else {
        debug!("no CJK font found; Japanese text may render as boxes");
        return;
    };
    let mut fonts = egui::FontDefinitions::default();
    fonts.font_data.insert("cjk".to_owned(), egui::FontData::from_owned(bytes));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts.families.entry(family).or_default().insert(0, "cjk".to_owned());
    }
    ctx.set_fonts(fonts);
    debug!(path, "applied CJK font");
}

/// Opens the window, starts translating `target` and blocks until the window
/// closes. Must be called on the main thread.
pub fn run<T: Translator, R: Renderer>(
    orchestrator: Orchestrator<T, R>,
    target: String,
    window: &WindowConfig,
) -> anyhow::Result<()> {
    let (surface, tasks) = EguiSurface::new();
    let mut viewport = egui::ViewportBuilder::default()
        .with_title(window.title.clone())
        .with_inner_size([window.width, window.height])
        .with_resizable(false);
    if window.always_on_top {
        viewport = viewport.with_always_on_top();
    }
    let native_options = eframe::NativeOptions { viewport, ..Default::default() };

    info!("viewer: starting event loop");
    eframe::run_native(
        &window.title,
        native_options,
        Box::new(move |cc| {
            let display = DisplayHandle::new(surface);
            display.surface().attach(cc.egui_ctx.clone());
            // The worker is detached; closing the window only drops its result.
            if let Err(e) = orchestrator.run_translation(target, &display) {
                error!(error = %e, "failed to start translation");
                display.destroy();
            }
            Box::new(ViewerApp { display, tasks, fonts_set: false })
        }),
    )
    .map_err(|e| anyhow::anyhow!("viewer error: {e}"))?;
    info!("viewer: event loop exited");
    Ok(())
}
