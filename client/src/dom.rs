use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, Window};

use crate::state::Tool;

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

/// The overlay canvas, stacked on top of the host's page container.
///
/// Created when an annotator is constructed and removed from the DOM when it is dropped.
pub struct OverlayMount {
    window: Window,
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl OverlayMount {
    pub fn attach(container_id: &str) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Missing document"))?;
        let container: HtmlElement = get_element(&document, container_id)?;
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        let style = canvas.style();
        style.set_property("position", "absolute")?;
        style.set_property("left", "0")?;
        style.set_property("top", "0")?;
        style.set_property("width", "100%")?;
        style.set_property("height", "100%")?;
        style.set_property("z-index", "10")?;
        container.append_child(&canvas)?;

        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("Missing 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let mount = Self {
            window,
            container,
            canvas,
            ctx,
        };
        mount.resize();
        mount.set_mode(Tool::Annotate);
        Ok(mount)
    }

    pub fn context(&self) -> CanvasRenderingContext2d {
        self.ctx.clone()
    }

    /// Matches the backing store to the element size and device pixel ratio.
    /// Returns the drawable size in CSS pixels.
    pub fn resize(&self) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        let dpr = self.window.device_pixel_ratio();
        self.canvas.set_width((rect.width() * dpr) as u32);
        self.canvas.set_height((rect.height() * dpr) as u32);
        let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
        (rect.width(), rect.height())
    }

    pub fn size(&self) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        (rect.width(), rect.height())
    }

    /// Viewport position of the overlay's top-left corner.
    pub fn origin(&self) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        (rect.left(), rect.top())
    }

    /// In annotate mode the overlay lets events fall through to the text layer below.
    pub fn set_mode(&self, tool: Tool) {
        let (pointer_events, cursor) = match tool {
            Tool::Annotate => ("none", "default"),
            Tool::Draw => ("auto", "crosshair"),
        };
        let style = self.canvas.style();
        let _ = style.set_property("pointer-events", pointer_events);
        let _ = style.set_property("cursor", cursor);
        let _ = style.set_property("touch-action", if tool == Tool::Draw { "none" } else { "auto" });
    }
}

impl Drop for OverlayMount {
    fn drop(&mut self) {
        let _ = self.container.remove_child(&self.canvas);
    }
}
