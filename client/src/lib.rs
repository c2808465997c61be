mod actions;
mod app;
mod config;
mod dom;
mod error;
mod geometry;
mod net;
mod render;
mod state;
mod store;
mod sync;

pub use actions::{
    cancel_pending, clear_all, confirm_pending, pointer_down, pointer_move, pointer_up,
    propose_highlight, propose_highlight_pixels, set_page_count, set_tool, toggle_mode,
};
pub use app::{run, PdfAnnotator};
pub use config::ViewerConfig;
pub use error::ClientError;
pub use geometry::{
    pixel_rect_to_region, region_to_viewport, to_page_percent, to_page_percent_clamped,
    to_viewport, FixedLayout, PageBox, PageLayout, PixelRect,
};
pub use net::{annotations_url, HttpEndpoint, MemoryEndpoint};
pub use render::{redraw, render_page, CanvasSurface, DrawingSurface};
pub use state::{ActiveStroke, DrawMode, Mode, PendingHighlight, PointerOutcome, State, Tool};
pub use store::AnnotationStore;
pub use sync::{
    begin_save, close_document, complete_load, complete_save, finish_load, load_document,
    open_document, save_document, AnnotationEndpoint, LoadOutcome, LoadTicket, Notice,
    SaveRequest, SyncController, SyncStatus,
};
