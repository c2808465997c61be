use web_sys::CanvasRenderingContext2d;

use pdfmark_shared::PagePoint;

use crate::config::ViewerConfig;
use crate::geometry::{region_to_viewport, to_viewport, PageBox, PageLayout, PixelRect};
use crate::state::State;

/// Whatever actually puts pixels on screen.
pub trait DrawingSurface {
    fn clear(&mut self, width: f64, height: f64);

    fn fill_rect(&mut self, rect: &PixelRect, color: &str, opacity: f64);

    /// Connected line through `points`, in order. A single point is drawn as a dot.
    fn polyline(&mut self, points: &[(f64, f64)], color: &str, width: f64);
}

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        Self { ctx }
    }
}

impl DrawingSurface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn fill_rect(&mut self, rect: &PixelRect, color: &str, opacity: f64) {
        self.ctx.save();
        self.ctx.set_global_alpha(opacity);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(rect.left, rect.top, rect.width, rect.height);
        self.ctx.restore();
    }

    fn polyline(&mut self, points: &[(f64, f64)], color: &str, width: f64) {
        let Some(&(first_x, first_y)) = points.first() else {
            return;
        };
        if points.len() == 1 {
            self.ctx.set_fill_style_str(color);
            self.ctx.begin_path();
            let _ = self
                .ctx
                .arc(first_x, first_y, width / 2.0, 0.0, std::f64::consts::PI * 2.0);
            self.ctx.fill();
            return;
        }
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(first_x, first_y);
        for &(x, y) in &points[1..] {
            self.ctx.line_to(x, y);
        }
        self.ctx.stroke();
    }
}

fn to_pixels(points: &[PagePoint], page: &PageBox) -> Vec<(f64, f64)> {
    points.iter().map(|point| to_viewport(*point, page)).collect()
}

/// Draws one page's marks: its highlights, then its strokes, then anything in progress.
pub fn render_page(
    state: &State,
    page_index: usize,
    page: &PageBox,
    surface: &mut dyn DrawingSurface,
    config: &ViewerConfig,
) {
    if page.is_degenerate() {
        return;
    }
    for highlight in state.store.highlights_for_page(page_index) {
        let rect = region_to_viewport(&highlight.highlight_area, page);
        surface.fill_rect(&rect, &config.highlight_color, config.highlight_opacity);
    }
    for stroke in state.store.strokes_for_page(page_index) {
        surface.polyline(
            &to_pixels(&stroke.points, page),
            &config.stroke_color,
            config.stroke_width,
        );
    }
    if let Some(active) = state
        .active_stroke()
        .filter(|active| active.page_index() == page_index)
    {
        surface.polyline(
            &to_pixels(active.points(), page),
            &config.stroke_color,
            config.stroke_width,
        );
    }
    if let Some(pending) = state
        .pending()
        .filter(|pending| pending.page_index == page_index)
    {
        let rect = region_to_viewport(&pending.region, page);
        surface.fill_rect(&rect, &config.pending_color, config.highlight_opacity);
    }
}

/// Clears the overlay and redraws every page the layout reports.
pub fn redraw(
    state: &State,
    layout: &dyn PageLayout,
    surface: &mut dyn DrawingSurface,
    config: &ViewerConfig,
    width: f64,
    height: f64,
) {
    surface.clear(width, height);
    for page_index in 0..layout.page_count() {
        if let Some(page) = layout.page_box(page_index) {
            render_page(state, page_index, &page, surface, config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{confirm_pending, pointer_down, pointer_move, propose_highlight, set_tool};
    use crate::geometry::FixedLayout;
    use crate::state::Tool;
    use pdfmark_shared::Region;

    #[derive(Default)]
    struct RecordingSurface {
        rects: Vec<(PixelRect, String)>,
        lines: Vec<Vec<(f64, f64)>>,
        clears: usize,
    }

    impl DrawingSurface for RecordingSurface {
        fn clear(&mut self, _: f64, _: f64) {
            self.clears += 1;
        }

        fn fill_rect(&mut self, rect: &PixelRect, color: &str, _: f64) {
            self.rects.push((*rect, color.to_string()));
        }

        fn polyline(&mut self, points: &[(f64, f64)], _: &str, _: f64) {
            self.lines.push(points.to_vec());
        }
    }

    fn region(left: f64) -> Region {
        Region {
            left,
            top: 50.0,
            width: 10.0,
            height: 10.0,
        }
    }

    #[test]
    fn only_the_requested_page_is_drawn() {
        let mut state = State::new();
        for (left, page) in [(0.0, 0), (20.0, 1), (40.0, 0)] {
            propose_highlight(&mut state, region(left), "x".into(), page);
            confirm_pending(&mut state);
        }
        let page = PageBox::new(0.0, 0.0, 200.0, 100.0);
        let mut surface = RecordingSurface::default();
        render_page(&state, 0, &page, &mut surface, &ViewerConfig::default());

        let lefts: Vec<f64> = surface.rects.iter().map(|(rect, _)| rect.left).collect();
        assert_eq!(lefts, [0.0, 80.0]);
        assert!(surface.rects.iter().all(|(_, color)| color == "yellow"));
    }

    #[test]
    fn active_stroke_and_pending_selection_are_drawn() {
        let layout = FixedLayout::new(vec![PageBox::new(0.0, 0.0, 100.0, 100.0)]);
        let mut state = State::new();
        propose_highlight(&mut state, region(0.0), "x".into(), 0);
        set_tool(&mut state, Tool::Draw);
        pointer_down(&mut state, &layout, 10.0, 10.0);
        pointer_move(&mut state, &layout, 20.0, 30.0);

        let mut surface = RecordingSurface::default();
        redraw(&state, &layout, &mut surface, &ViewerConfig::default(), 100.0, 100.0);
        assert_eq!(surface.clears, 1);
        assert_eq!(surface.lines, vec![vec![(10.0, 10.0), (20.0, 30.0)]]);
        assert_eq!(surface.rects.len(), 1);
        assert_eq!(surface.rects[0].1, "#5b9bd5");
    }
}
