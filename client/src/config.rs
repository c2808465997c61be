use serde::Deserialize;

/// Host-supplied viewer settings. Every field is optional in the host's JSON.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Prefix for annotation requests; empty means same origin.
    pub api_base: String,
    pub highlight_color: String,
    pub highlight_opacity: f64,
    pub pending_color: String,
    pub stroke_color: String,
    pub stroke_width: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            highlight_color: "yellow".to_string(),
            highlight_opacity: 0.4,
            pending_color: "#5b9bd5".to_string(),
            stroke_color: "red".to_string(),
            stroke_width: 5.0,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(text)?;
        config.highlight_opacity = sanitize_opacity(config.highlight_opacity);
        config.stroke_width = sanitize_width(config.stroke_width);
        Ok(config)
    }
}

fn sanitize_opacity(opacity: f64) -> f64 {
    let opacity = if opacity.is_finite() { opacity } else { 0.4 };
    opacity.clamp(0.0, 1.0)
}

fn sanitize_width(width: f64) -> f64 {
    let width = if width.is_finite() { width } else { 5.0 };
    width.clamp(1.0, 60.0)
}
