use bincode::{Decode, Encode};
use serde::{Deserialize, Deserializer, Serialize};

mod annotation_file;

pub use annotation_file::{
    decode_annotation_file, encode_annotation_file, AnnotationFileError, ANNOTATION_FILE_MAGIC,
    ANNOTATION_FILE_VERSION,
};

/// Upper bound of percentage space on either axis.
pub const PERCENT_MAX: f64 = 100.0;

const EDGE_TOLERANCE: f64 = 1e-9;

/// A point in percentage space of a page: `0..=100` on both axes, origin top-left.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq)]
pub struct PagePoint {
    pub x: f64,
    pub y: f64,
}

impl PagePoint {
    pub fn clamp(self) -> Self {
        Self {
            x: clamp_percent(self.x),
            y: clamp_percent(self.y),
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

fn clamp_percent(value: f64) -> f64 {
    value.max(0.0).min(PERCENT_MAX)
}

/// A rectangle in percentage space of a page.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// True when the region has a positive size and lies entirely on the page.
    pub fn is_within_page(&self) -> bool {
        self.is_finite()
            && self.width > 0.0
            && self.height > 0.0
            && self.left >= 0.0
            && self.top >= 0.0
            && self.right() <= PERCENT_MAX + EDGE_TOLERANCE
            && self.bottom() <= PERCENT_MAX + EDGE_TOLERANCE
    }

    pub fn contains(&self, point: PagePoint) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
pub struct Highlight {
    pub id: String,
    pub content: String,
    #[serde(rename = "highlightArea")]
    pub highlight_area: Region,
    #[serde(rename = "pageIndex")]
    pub page_index: usize,
}

/// One freehand gesture. Points are in percentage space of `page_index`, in capture order.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
pub struct Stroke {
    #[serde(rename = "pageIndex")]
    pub page_index: usize,
    pub points: Vec<PagePoint>,
}

/// Everything persisted for one document. Saved and loaded as a whole.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, Default, PartialEq)]
pub struct AnnotationSet {
    #[serde(
        rename = "annotations",
        alias = "highlights",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub highlights: Vec<Highlight>,
    #[serde(
        rename = "drawings",
        alias = "strokes",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub strokes: Vec<Stroke>,
}

impl AnnotationSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty() && self.strokes.is_empty()
    }

    pub fn highlights_for_page(&self, page_index: usize) -> impl Iterator<Item = &Highlight> + '_ {
        self.highlights
            .iter()
            .filter(move |highlight| highlight.page_index == page_index)
    }

    pub fn strokes_for_page(&self, page_index: usize) -> impl Iterator<Item = &Stroke> + '_ {
        self.strokes
            .iter()
            .filter(move |stroke| stroke.page_index == page_index)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlight(id: &str, page_index: usize) -> Highlight {
        Highlight {
            id: id.to_string(),
            content: format!("text {id}"),
            highlight_area: Region {
                left: 10.0,
                top: 20.0,
                width: 30.0,
                height: 5.0,
            },
            page_index,
        }
    }

    #[test]
    fn highlights_for_page_keeps_insertion_order() {
        let set = AnnotationSet {
            highlights: vec![
                highlight("1", 2),
                highlight("2", 0),
                highlight("3", 2),
                highlight("4", 1),
            ],
            strokes: Vec::new(),
        };
        let ids: Vec<&str> = set
            .highlights_for_page(2)
            .map(|highlight| highlight.id.as_str())
            .collect();
        assert_eq!(ids, ["1", "3"]);
        assert_eq!(set.highlights_for_page(7).count(), 0);
    }

    #[test]
    fn wire_format_uses_backend_field_names() {
        let set = AnnotationSet {
            highlights: vec![highlight("1", 2)],
            strokes: vec![Stroke {
                page_index: 0,
                points: vec![PagePoint { x: 12.5, y: 40.0 }],
            }],
        };
        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(value["annotations"][0]["pageIndex"], 2);
        assert_eq!(value["annotations"][0]["highlightArea"]["left"], 10.0);
        assert_eq!(value["drawings"][0]["points"][0]["x"], 12.5);
        assert!(value.get("highlights").is_none());
    }

    #[test]
    fn reads_stored_records_with_nulls_and_extra_fields() {
        let text = r#"{
            "annotations": [{
                "id": "1",
                "content": "abstract",
                "highlightArea": {"left": 1, "top": 2, "width": 3, "height": 4, "pageIndex": 5},
                "pageIndex": 5
            }],
            "drawings": null
        }"#;
        let set: AnnotationSet = serde_json::from_str(text).unwrap();
        assert_eq!(set.highlights.len(), 1);
        assert_eq!(set.highlights[0].page_index, 5);
        assert_eq!(set.highlights[0].highlight_area.height, 4.0);
        assert!(set.strokes.is_empty());

        let aliased: AnnotationSet =
            serde_json::from_str(r#"{"highlights": [], "strokes": []}"#).unwrap();
        assert!(aliased.is_empty());
        let missing: AnnotationSet = serde_json::from_str("{}").unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn region_page_bounds() {
        let inside = Region {
            left: 10.0,
            top: 20.0,
            width: 30.0,
            height: 5.0,
        };
        assert!(inside.is_within_page());
        assert!(inside.contains(PagePoint { x: 15.0, y: 22.0 }));
        assert!(!inside.contains(PagePoint { x: 5.0, y: 22.0 }));

        let overflowing = Region {
            left: 90.0,
            ..inside
        };
        assert!(!overflowing.is_within_page());
        let empty = Region {
            width: 0.0,
            ..inside
        };
        assert!(!empty.is_within_page());
        let nan = Region {
            top: f64::NAN,
            ..inside
        };
        assert!(!nan.is_within_page());
    }

    #[test]
    fn clamp_pins_to_page_edges() {
        let point = PagePoint { x: -4.0, y: 130.0 }.clamp();
        assert_eq!(point, PagePoint { x: 0.0, y: 100.0 });
    }
}
