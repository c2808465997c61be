use std::collections::HashSet;

use pdfmark_shared::{AnnotationSet, Highlight, PagePoint, Stroke};

use crate::error::AppError;

pub const MAX_STROKES: usize = 2000;
pub const MAX_POINTS_PER_STROKE: usize = 5000;
pub const MAX_HIGHLIGHTS: usize = 5000;
pub const MAX_ID_LEN: usize = 64;

/// Document ids end up as file names, so only a conservative alphabet is accepted.
pub fn normalize_document_id(value: &str) -> Option<String> {
    let valid = !value.is_empty()
        && value.len() <= MAX_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then(|| value.to_string())
}

// JSON cannot carry NaN or infinity, so the finiteness checks here only matter for
// sets handed to `prepare_for_storage` by other Rust callers.
fn normalize_point(point: PagePoint) -> Option<PagePoint> {
    point.is_finite().then_some(point)
}

fn sanitize_stroke(mut stroke: Stroke) -> Option<Stroke> {
    stroke.points = stroke
        .points
        .into_iter()
        .filter_map(normalize_point)
        .collect();
    if stroke.points.is_empty() {
        return None;
    }
    Some(stroke)
}

/// Drops unusable points, then strokes left with none.
pub fn sanitize_strokes(strokes: Vec<Stroke>) -> Vec<Stroke> {
    strokes.into_iter().filter_map(sanitize_stroke).collect()
}

fn validate_highlights(highlights: &[Highlight]) -> Result<(), AppError> {
    if highlights.len() > MAX_HIGHLIGHTS {
        return Err(AppError::BadRequest(format!(
            "too many highlights: {} (max {MAX_HIGHLIGHTS})",
            highlights.len()
        )));
    }
    let mut seen = HashSet::new();
    for highlight in highlights {
        if highlight.id.is_empty() || highlight.id.len() > MAX_ID_LEN {
            return Err(AppError::BadRequest(format!(
                "invalid highlight id {:?}",
                highlight.id
            )));
        }
        if !seen.insert(highlight.id.as_str()) {
            return Err(AppError::BadRequest(format!(
                "duplicate highlight id {:?}",
                highlight.id
            )));
        }
        if !highlight.highlight_area.is_finite() {
            return Err(AppError::BadRequest(format!(
                "highlight {:?} has a non-numeric region",
                highlight.id
            )));
        }
    }
    Ok(())
}

fn validate_strokes(strokes: &[Stroke]) -> Result<(), AppError> {
    if strokes.len() > MAX_STROKES {
        return Err(AppError::BadRequest(format!(
            "too many strokes: {} (max {MAX_STROKES})",
            strokes.len()
        )));
    }
    if let Some(index) = strokes
        .iter()
        .position(|stroke| stroke.points.len() > MAX_POINTS_PER_STROKE)
    {
        return Err(AppError::BadRequest(format!(
            "stroke {index} has more than {MAX_POINTS_PER_STROKE} points"
        )));
    }
    Ok(())
}

/// Checks an incoming set against the storage limits and returns what should be stored.
pub fn prepare_for_storage(set: AnnotationSet) -> Result<AnnotationSet, AppError> {
    validate_highlights(&set.highlights)?;
    validate_strokes(&set.strokes)?;
    Ok(AnnotationSet {
        highlights: set.highlights,
        strokes: sanitize_strokes(set.strokes),
    })
}
