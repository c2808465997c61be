use pdfmark_shared::{PagePoint, Region, PERCENT_MAX};

/// Rendered bounding box of one page, in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PageBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A box that cannot anchor percentage coordinates.
    pub fn is_degenerate(&self) -> bool {
        !(self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }
}

/// Rectangle in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Page geometry as reported by the PDF renderer for the current zoom and scroll.
pub trait PageLayout {
    fn page_count(&self) -> usize;

    fn page_box(&self, page_index: usize) -> Option<PageBox>;

    /// First page whose box contains the viewport point.
    fn page_at(&self, x: f64, y: f64) -> Option<(usize, PageBox)> {
        (0..self.page_count()).find_map(|page_index| {
            self.page_box(page_index)
                .filter(|page| !page.is_degenerate() && page.contains(x, y))
                .map(|page| (page_index, page))
        })
    }
}

/// Layout backed by a list of boxes, indexed by page.
#[derive(Clone, Debug, Default)]
pub struct FixedLayout {
    pages: Vec<PageBox>,
}

impl FixedLayout {
    pub fn new(pages: Vec<PageBox>) -> Self {
        Self { pages }
    }

    pub fn set_pages(&mut self, pages: Vec<PageBox>) {
        self.pages = pages;
    }

    pub fn pages(&self) -> &[PageBox] {
        &self.pages
    }
}

impl PageLayout for FixedLayout {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_box(&self, page_index: usize) -> Option<PageBox> {
        self.pages.get(page_index).copied()
    }
}

fn finite_pixel(x: f64, y: f64) -> Option<(f64, f64)> {
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some((x, y))
}

fn percent_of(page: &PageBox, x: f64, y: f64) -> PagePoint {
    PagePoint {
        x: PERCENT_MAX * (x - page.left) / page.width,
        y: PERCENT_MAX * (y - page.top) / page.height,
    }
}

/// Viewport pixel to page percentage. Points outside the page are rejected.
pub fn to_page_percent(x: f64, y: f64, page: &PageBox) -> Option<PagePoint> {
    let (x, y) = finite_pixel(x, y)?;
    if page.is_degenerate() || !page.contains(x, y) {
        return None;
    }
    Some(percent_of(page, x, y))
}

/// Like [`to_page_percent`], but pins points past the page edge onto it.
pub fn to_page_percent_clamped(x: f64, y: f64, page: &PageBox) -> Option<PagePoint> {
    let (x, y) = finite_pixel(x, y)?;
    if page.is_degenerate() {
        return None;
    }
    Some(percent_of(page, x, y).clamp())
}

/// Page percentage to viewport pixel. Rendering only.
pub fn to_viewport(point: PagePoint, page: &PageBox) -> (f64, f64) {
    (
        page.left + point.x * page.width / PERCENT_MAX,
        page.top + point.y * page.height / PERCENT_MAX,
    )
}

pub fn region_to_viewport(region: &Region, page: &PageBox) -> PixelRect {
    let (left, top) = to_viewport(
        PagePoint {
            x: region.left,
            y: region.top,
        },
        page,
    );
    PixelRect {
        left,
        top,
        width: region.width * page.width / PERCENT_MAX,
        height: region.height * page.height / PERCENT_MAX,
    }
}

/// Pixel rectangle to page region. The rectangle must lie fully on the page.
pub fn pixel_rect_to_region(rect: &PixelRect, page: &PageBox) -> Option<Region> {
    let top_left = to_page_percent(rect.left, rect.top, page)?;
    let bottom_right = to_page_percent(rect.left + rect.width, rect.top + rect.height, page)?;
    let region = Region {
        left: top_left.x,
        top: top_left.y,
        width: bottom_right.x - top_left.x,
        height: bottom_right.y - top_left.y,
    };
    region.is_within_page().then_some(region)
}
