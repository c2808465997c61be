use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use pdfmark_shared::{Highlight, Region};

use crate::actions;
use crate::config::ViewerConfig;
use crate::dom::OverlayMount;
use crate::geometry::{FixedLayout, PageBox, PageLayout};
use crate::net::HttpEndpoint;
use crate::render::{redraw, CanvasSurface};
use crate::state::{PointerOutcome, State, Tool};
use crate::sync::{
    close_document, finish_load, open_document, save_document, LoadOutcome, Notice,
};

fn debug_enabled(window: &web_sys::Window) -> bool {
    let search = window.location().search().ok().unwrap_or_default();
    search.contains("debug=1") || search.contains("debug=true")
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let level = match web_sys::window() {
        Some(window) if debug_enabled(&window) => log::Level::Debug,
        _ => log::Level::Info,
    };
    // Fails only if a logger is already installed.
    let _ = console_log::init_with_level(level);
    Ok(())
}

struct Inner {
    state: RefCell<State>,
    layout: RefCell<FixedLayout>,
    overlay: OverlayMount,
    surface: RefCell<CanvasSurface>,
    config: ViewerConfig,
    endpoint: HttpEndpoint,
    on_notice: RefCell<Option<Function>>,
}

impl Inner {
    /// Page boxes relative to the overlay canvas instead of the viewport.
    fn overlay_layout(&self) -> FixedLayout {
        let (origin_x, origin_y) = self.overlay.origin();
        let pages = self
            .layout
            .borrow()
            .pages()
            .iter()
            .map(|page| PageBox::new(page.left - origin_x, page.top - origin_y, page.width, page.height))
            .collect();
        FixedLayout::new(pages)
    }

    fn redraw(&self) {
        let (width, height) = self.overlay.size();
        let layout = self.overlay_layout();
        redraw(
            &self.state.borrow(),
            &layout,
            &mut *self.surface.borrow_mut(),
            &self.config,
            width,
            height,
        );
    }

    fn notify(&self, notice: &Notice) {
        let message = notice.message();
        match self.on_notice.borrow().as_ref() {
            Some(callback) => {
                let result = callback.call2(
                    &JsValue::NULL,
                    &JsValue::from_str(&message),
                    &JsValue::from_bool(notice.is_error()),
                );
                if let Err(err) = result {
                    log::warn!("notice handler threw: {err:?}");
                }
            }
            None if notice.is_error() => log::error!("{message}"),
            None => log::info!("{message}"),
        }
    }

    fn after_pointer(&self, outcome: PointerOutcome) -> bool {
        if outcome == PointerOutcome::Consumed {
            self.redraw();
        }
        outcome != PointerOutcome::PassThrough
    }
}

/// One viewer's annotation overlay, driven by the host page's PDF renderer.
#[wasm_bindgen]
pub struct PdfAnnotator {
    inner: Rc<Inner>,
}

#[wasm_bindgen]
impl PdfAnnotator {
    /// Mounts the overlay inside `container_id`. `config_json` may be omitted for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, config_json: Option<String>) -> Result<PdfAnnotator, JsValue> {
        let config = match config_json.as_deref() {
            Some(text) => ViewerConfig::from_json(text)
                .map_err(|err| JsValue::from_str(&format!("Invalid viewer config: {err}")))?,
            None => ViewerConfig::default(),
        };
        let overlay = OverlayMount::attach(container_id)?;
        let surface = CanvasSurface::new(overlay.context());
        let endpoint = HttpEndpoint::new(config.api_base.clone());
        log::debug!("annotator mounted in #{container_id}");
        Ok(Self {
            inner: Rc::new(Inner {
                state: RefCell::new(State::new()),
                layout: RefCell::new(FixedLayout::default()),
                overlay,
                surface: RefCell::new(surface),
                config,
                endpoint,
                on_notice: RefCell::new(None),
            }),
        })
    }

    /// `callback(message, isError)` receives load and save results.
    pub fn set_notice_handler(&self, callback: Option<Function>) {
        *self.inner.on_notice.borrow_mut() = callback;
    }

    pub fn open(&self, document_id: String) {
        let ticket = open_document(&mut self.inner.state.borrow_mut(), &document_id);
        self.inner.redraw();
        let inner = self.inner.clone();
        spawn_local(async move {
            match finish_load(&inner.state, &inner.endpoint, ticket).await {
                LoadOutcome::Applied => inner.redraw(),
                LoadOutcome::Stale => {}
                LoadOutcome::Failed(notice) => {
                    inner.redraw();
                    inner.notify(&notice);
                }
            }
        });
    }

    pub fn close(&self) {
        close_document(&mut self.inner.state.borrow_mut());
        self.inner.redraw();
    }

    /// Flat `[left, top, width, height, ...]` viewport boxes, one group of four per page.
    pub fn set_page_boxes(&self, boxes: &[f64]) {
        let pages: Vec<PageBox> = boxes
            .chunks_exact(4)
            .map(|chunk| PageBox::new(chunk[0], chunk[1], chunk[2], chunk[3]))
            .collect();
        actions::set_page_count(&mut self.inner.state.borrow_mut(), pages.len());
        self.inner.layout.borrow_mut().set_pages(pages);
        self.inner.redraw();
    }

    /// Re-syncs the canvas after the container changed size.
    pub fn resize(&self) {
        self.inner.overlay.resize();
        self.inner.redraw();
    }

    /// Returns true when the host should not act on the event itself.
    pub fn pointer_down(&self, client_x: f64, client_y: f64) -> bool {
        let outcome = {
            let layout = self.inner.layout.borrow();
            actions::pointer_down(&mut self.inner.state.borrow_mut(), &*layout, client_x, client_y)
        };
        self.inner.after_pointer(outcome)
    }

    pub fn pointer_move(&self, client_x: f64, client_y: f64) -> bool {
        let outcome = {
            let layout = self.inner.layout.borrow();
            actions::pointer_move(&mut self.inner.state.borrow_mut(), &*layout, client_x, client_y)
        };
        self.inner.after_pointer(outcome)
    }

    pub fn pointer_up(&self) -> bool {
        let outcome = actions::pointer_up(&mut self.inner.state.borrow_mut());
        self.inner.after_pointer(outcome)
    }

    /// Selection region in page percentages, as reported by the PDF renderer.
    pub fn propose_highlight(
        &self,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        content: String,
        page_index: usize,
    ) -> bool {
        let region = Region {
            left,
            top,
            width,
            height,
        };
        let proposed = actions::propose_highlight(
            &mut self.inner.state.borrow_mut(),
            region,
            content,
            page_index,
        );
        if proposed {
            self.inner.redraw();
        }
        proposed
    }

    /// Viewport position for the confirm control of the pending selection, as `[x, y]`.
    pub fn pending_control_anchor(&self) -> Option<Vec<f64>> {
        let state = self.inner.state.borrow();
        let pending = state.pending()?;
        let page = self.inner.layout.borrow().page_box(pending.page_index)?;
        let (x, y) = pending.control_anchor(&page);
        Some(vec![x, y])
    }

    pub fn confirm_pending(&self) -> Option<String> {
        let id = actions::confirm_pending(&mut self.inner.state.borrow_mut());
        self.inner.redraw();
        id
    }

    pub fn cancel_pending(&self) -> bool {
        let cancelled = actions::cancel_pending(&mut self.inner.state.borrow_mut());
        self.inner.redraw();
        cancelled
    }

    /// Switches between annotate and draw mode. Returns true if draw mode is now active.
    pub fn toggle_mode(&self) -> bool {
        let tool = actions::toggle_mode(&mut self.inner.state.borrow_mut());
        self.inner.overlay.set_mode(tool);
        self.inner.redraw();
        tool == Tool::Draw
    }

    pub fn is_draw_mode(&self) -> bool {
        self.inner.state.borrow().is_draw_mode()
    }

    pub fn clear_all(&self) {
        actions::clear_all(&mut self.inner.state.borrow_mut());
        self.inner.redraw();
    }

    pub fn save(&self) {
        let inner = self.inner.clone();
        spawn_local(async move {
            match save_document(&inner.state, &inner.endpoint).await {
                Some(notice) => inner.notify(&notice),
                None => log::debug!("save skipped: no document is ready"),
            }
        });
    }

    /// JSON array of the highlights on `page_index`, in insertion order.
    pub fn highlights_for_page(&self, page_index: usize) -> Result<String, JsValue> {
        let state = self.inner.state.borrow();
        let highlights: Vec<&Highlight> = state.store.highlights_for_page(page_index).collect();
        serde_json::to_string(&highlights).map_err(|err| JsValue::from_str(&err.to_string()))
    }
}
