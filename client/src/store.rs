use pdfmark_shared::{AnnotationSet, Highlight, Region, Stroke};

/// The open document's annotations. Single source of truth for rendering and saving.
#[derive(Debug)]
pub struct AnnotationStore {
    set: AnnotationSet,
    next_id: u64,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::from_set(AnnotationSet::empty())
    }

    pub fn from_set(set: AnnotationSet) -> Self {
        let next_id = set.highlights.len() as u64 + 1;
        Self { set, next_id }
    }

    /// Swaps in a whole set. Nothing from the previous one is kept.
    pub fn replace(&mut self, set: AnnotationSet) {
        *self = Self::from_set(set);
    }

    pub fn snapshot(&self) -> AnnotationSet {
        self.set.clone()
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.set.highlights
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.set.strokes
    }

    pub fn highlights_for_page(&self, page_index: usize) -> impl Iterator<Item = &Highlight> + '_ {
        self.set.highlights_for_page(page_index)
    }

    pub fn strokes_for_page(&self, page_index: usize) -> impl Iterator<Item = &Stroke> + '_ {
        self.set.strokes_for_page(page_index)
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn add_highlight(&mut self, region: Region, content: String, page_index: usize) -> &Highlight {
        let id = self.next_highlight_id();
        self.set.highlights.push(Highlight {
            id,
            content,
            highlight_area: region,
            page_index,
        });
        &self.set.highlights[self.set.highlights.len() - 1]
    }

    /// Appends a sealed stroke. Strokes without points are refused.
    pub fn add_stroke(&mut self, stroke: Stroke) -> bool {
        if stroke.points.is_empty() {
            return false;
        }
        self.set.strokes.push(stroke);
        true
    }

    pub fn clear_all(&mut self) {
        self.replace(AnnotationSet::empty());
    }

    fn next_highlight_id(&mut self) -> String {
        loop {
            let id = self.next_id.to_string();
            self.next_id += 1;
            if !self.set.highlights.iter().any(|highlight| highlight.id == id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfmark_shared::PagePoint;

    fn region() -> Region {
        Region {
            left: 1.0,
            top: 2.0,
            width: 3.0,
            height: 4.0,
        }
    }

    #[test]
    fn ids_count_up_from_one() {
        let mut store = AnnotationStore::new();
        assert_eq!(store.add_highlight(region(), "a".into(), 0).id, "1");
        assert_eq!(store.add_highlight(region(), "b".into(), 1).id, "2");
    }

    #[test]
    fn ids_stay_unique_after_loading_gapped_set() {
        let mut store = AnnotationStore::new();
        store.add_highlight(region(), "a".into(), 0);
        store.add_highlight(region(), "b".into(), 0);
        store.add_highlight(region(), "c".into(), 0);
        let mut set = store.snapshot();
        set.highlights.remove(1);

        let mut reloaded = AnnotationStore::from_set(set);
        let id = reloaded.add_highlight(region(), "d".into(), 0).id.clone();
        assert_eq!(id, "4");
        let ids: Vec<&str> = reloaded.highlights().iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["1", "3", "4"]);
    }

    #[test]
    fn empty_strokes_are_refused() {
        let mut store = AnnotationStore::new();
        assert!(!store.add_stroke(Stroke {
            page_index: 0,
            points: Vec::new(),
        }));
        assert!(store.add_stroke(Stroke {
            page_index: 0,
            points: vec![PagePoint { x: 1.0, y: 1.0 }],
        }));
        assert_eq!(store.strokes().len(), 1);
    }

    #[test]
    fn clear_all_empties_both_lists() {
        let mut store = AnnotationStore::new();
        store.add_highlight(region(), "a".into(), 0);
        store.add_stroke(Stroke {
            page_index: 0,
            points: vec![PagePoint { x: 1.0, y: 1.0 }],
        });
        store.clear_all();
        assert!(store.is_empty());
        assert_eq!(store.add_highlight(region(), "b".into(), 0).id, "1");
    }
}
