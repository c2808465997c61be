use pdfmark_shared::{PagePoint, Region, Stroke, PERCENT_MAX};

use crate::geometry::{to_viewport, PageBox};
use crate::store::AnnotationStore;
use crate::sync::SyncController;

/// Vertical gap between a pending selection and its confirm control, in pixels.
pub const CONTROL_OFFSET_PX: f64 = 8.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    Annotate,
    Draw,
}

/// What the host should do with a pointer event after handing it to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Annotate mode: let the page (scrolling, text selection) have it.
    PassThrough,
    /// Draw mode: the event fed the stroke being captured.
    Consumed,
    /// Draw mode owns the event, but it produced nothing.
    Ignored,
}

/// Stroke under construction. Owned by the capture state machine and append-only.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveStroke {
    page_index: usize,
    points: Vec<PagePoint>,
}

impl ActiveStroke {
    pub fn new(page_index: usize, first: PagePoint) -> Self {
        Self {
            page_index,
            points: vec![first],
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn points(&self) -> &[PagePoint] {
        &self.points
    }

    /// Appends unless the point repeats the last one. Returns whether it was appended.
    pub fn push(&mut self, point: PagePoint) -> bool {
        if self.points.last() == Some(&point) {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn seal(self) -> Stroke {
        Stroke {
            page_index: self.page_index,
            points: self.points,
        }
    }
}

pub enum DrawMode {
    Idle,
    Capturing(ActiveStroke),
}

pub enum Mode {
    Annotate,
    Draw(DrawMode),
}

impl Mode {
    pub fn tool(&self) -> Tool {
        match self {
            Mode::Annotate => Tool::Annotate,
            Mode::Draw(_) => Tool::Draw,
        }
    }
}

/// A selection waiting for the user to confirm or cancel it.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingHighlight {
    pub region: Region,
    pub content: String,
    pub page_index: usize,
}

impl PendingHighlight {
    /// Where the confirm control goes: under the selection's left edge.
    pub fn control_anchor(&self, page: &PageBox) -> (f64, f64) {
        let (x, y) = to_viewport(
            PagePoint {
                x: self.region.left,
                y: (self.region.top + self.region.height).min(PERCENT_MAX),
            },
            page,
        );
        (x, y + CONTROL_OFFSET_PX)
    }
}

/// Everything one open viewer owns.
pub struct State {
    pub mode: Mode,
    pub store: AnnotationStore,
    pub pending: Option<PendingHighlight>,
    pub sync: SyncController,
    pub page_count: Option<usize>,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    pub fn new() -> Self {
        Self {
            mode: Mode::Annotate,
            store: AnnotationStore::new(),
            pending: None,
            sync: SyncController::new(),
            page_count: None,
        }
    }

    pub fn tool(&self) -> Tool {
        self.mode.tool()
    }

    pub fn is_draw_mode(&self) -> bool {
        self.tool() == Tool::Draw
    }

    pub fn active_stroke(&self) -> Option<&ActiveStroke> {
        match &self.mode {
            Mode::Draw(DrawMode::Capturing(active)) => Some(active),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingHighlight> {
        self.pending.as_ref()
    }

    /// Drops all per-document state. Mode is a viewer preference and survives.
    pub fn reset_document(&mut self) {
        self.store.replace(Default::default());
        self.pending = None;
        if let Mode::Draw(draw) = &mut self.mode {
            *draw = DrawMode::Idle;
        }
        self.page_count = None;
    }
}
