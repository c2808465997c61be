use pdfmark_shared::Region;

use crate::geometry::{
    pixel_rect_to_region, to_page_percent, to_page_percent_clamped, PageLayout, PixelRect,
};
use crate::state::{ActiveStroke, DrawMode, Mode, PendingHighlight, PointerOutcome, State, Tool};

pub fn set_tool(state: &mut State, tool: Tool) {
    match (tool, state.tool()) {
        (Tool::Draw, Tool::Annotate) => state.mode = Mode::Draw(DrawMode::Idle),
        (Tool::Annotate, Tool::Draw) => {
            seal_active_stroke(state);
            state.mode = Mode::Annotate;
        }
        _ => {}
    }
    log::debug!("mode set to {tool:?}");
}

pub fn toggle_mode(state: &mut State) -> Tool {
    let next = match state.tool() {
        Tool::Annotate => Tool::Draw,
        Tool::Draw => Tool::Annotate,
    };
    set_tool(state, next);
    next
}

/// Moves the in-progress stroke, if any, into the store.
fn seal_active_stroke(state: &mut State) -> bool {
    let Mode::Draw(draw) = &mut state.mode else {
        return false;
    };
    match std::mem::replace(draw, DrawMode::Idle) {
        DrawMode::Capturing(active) => {
            let stroke = active.seal();
            log::trace!(
                "sealed stroke on page {} with {} points",
                stroke.page_index,
                stroke.points.len()
            );
            state.store.add_stroke(stroke)
        }
        DrawMode::Idle => false,
    }
}

pub fn pointer_down(state: &mut State, layout: &dyn PageLayout, x: f64, y: f64) -> PointerOutcome {
    if !state.is_draw_mode() {
        return PointerOutcome::PassThrough;
    }
    // A second down without an up means the up was lost; keep what was drawn.
    seal_active_stroke(state);
    let Some((page_index, page)) = layout.page_at(x, y) else {
        log::trace!("pointer down at ({x}, {y}) is outside every page");
        return PointerOutcome::Ignored;
    };
    let Some(point) = to_page_percent(x, y, &page) else {
        return PointerOutcome::Ignored;
    };
    state.mode = Mode::Draw(DrawMode::Capturing(ActiveStroke::new(page_index, point)));
    PointerOutcome::Consumed
}

pub fn pointer_move(state: &mut State, layout: &dyn PageLayout, x: f64, y: f64) -> PointerOutcome {
    let Mode::Draw(draw) = &mut state.mode else {
        return PointerOutcome::PassThrough;
    };
    let DrawMode::Capturing(active) = draw else {
        return PointerOutcome::Ignored;
    };
    let Some(page) = layout.page_box(active.page_index()) else {
        return PointerOutcome::Ignored;
    };
    match to_page_percent_clamped(x, y, &page) {
        Some(point) if active.push(point) => PointerOutcome::Consumed,
        _ => PointerOutcome::Ignored,
    }
}

pub fn pointer_up(state: &mut State) -> PointerOutcome {
    if !state.is_draw_mode() {
        return PointerOutcome::PassThrough;
    }
    if seal_active_stroke(state) {
        PointerOutcome::Consumed
    } else {
        PointerOutcome::Ignored
    }
}

/// Records a finished text selection as pending. Nothing is added to the set yet.
pub fn propose_highlight(
    state: &mut State,
    region: Region,
    content: String,
    page_index: usize,
) -> bool {
    if state.is_draw_mode() {
        return false;
    }
    if !region.is_within_page() {
        log::trace!("selection {region:?} is not on page {page_index}");
        return false;
    }
    if state.page_count.is_some_and(|count| page_index >= count) {
        return false;
    }
    state.pending = Some(PendingHighlight {
        region,
        content,
        page_index,
    });
    true
}

/// Same as [`propose_highlight`] for a selection reported in viewport pixels.
pub fn propose_highlight_pixels(
    state: &mut State,
    layout: &dyn PageLayout,
    rect: PixelRect,
    content: String,
) -> bool {
    let Some((page_index, page)) = layout.page_at(rect.left, rect.top) else {
        return false;
    };
    match pixel_rect_to_region(&rect, &page) {
        Some(region) => propose_highlight(state, region, content, page_index),
        None => false,
    }
}

/// Adds the pending highlight to the set and returns its new id.
pub fn confirm_pending(state: &mut State) -> Option<String> {
    let pending = state.pending.take()?;
    let highlight = state
        .store
        .add_highlight(pending.region, pending.content, pending.page_index);
    log::debug!(
        "highlight {} added on page {}",
        highlight.id,
        highlight.page_index
    );
    Some(highlight.id.clone())
}

pub fn cancel_pending(state: &mut State) -> bool {
    state.pending.take().is_some()
}

/// Empties highlights and strokes in one step. Persisted only by the next save.
pub fn clear_all(state: &mut State) {
    state.store.clear_all();
    state.pending = None;
    if let Mode::Draw(draw) = &mut state.mode {
        *draw = DrawMode::Idle;
    }
}

pub fn set_page_count(state: &mut State, page_count: usize) {
    state.page_count = Some(page_count);
}
