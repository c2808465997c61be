use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use pdfmark_shared::AnnotationSet;

use crate::error::ClientError;
use crate::sync::AnnotationEndpoint;

pub fn annotations_url(api_base: &str, document_id: &str) -> String {
    format!(
        "{}/pdfs/{}/annotations",
        api_base.trim_end_matches('/'),
        urlencoding::encode(document_id)
    )
}

pub fn parse_annotations(text: &str) -> Result<AnnotationSet, ClientError> {
    serde_json::from_str(text).map_err(ClientError::Decode)
}

fn js_error(value: JsValue) -> ClientError {
    ClientError::Network(
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}")),
    )
}

/// Talks to the annotation server with the browser's `fetch`.
pub struct HttpEndpoint {
    api_base: String,
}

impl HttpEndpoint {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }

    async fn send(&self, method: &str, url: &str, body: Option<String>) -> Result<Response, ClientError> {
        let window = web_sys::window().ok_or(ClientError::NoWindow)?;
        let init = RequestInit::new();
        init.set_method(method);
        if let Some(body) = body {
            init.set_body(&JsValue::from_str(&body));
        }
        let request = Request::new_with_str_and_init(url, &init).map_err(js_error)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_error)?;
        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?;
        value.dyn_into::<Response>().map_err(js_error)
    }
}

#[async_trait(?Send)]
impl AnnotationEndpoint for HttpEndpoint {
    async fn fetch(&self, document_id: &str) -> Result<Option<AnnotationSet>, ClientError> {
        let url = annotations_url(&self.api_base, document_id);
        let response = self.send("GET", &url, None).await?;
        if response.status() == 404 {
            return Ok(None);
        }
        if !response.ok() {
            return Err(ClientError::Status(response.status()));
        }
        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?
            .as_string()
            .unwrap_or_default();
        parse_annotations(&text).map(Some)
    }

    async fn store(&self, document_id: &str, set: &AnnotationSet) -> Result<(), ClientError> {
        let url = annotations_url(&self.api_base, document_id);
        let body = serde_json::to_string(set).map_err(ClientError::Encode)?;
        let response = self.send("PUT", &url, Some(body)).await?;
        if !response.ok() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(())
    }
}

/// In-process endpoint for hosts without a server, and for tests.
#[derive(Default)]
pub struct MemoryEndpoint {
    documents: RefCell<HashMap<String, AnnotationSet>>,
}

impl MemoryEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document_id: &str, set: AnnotationSet) -> Self {
        let endpoint = Self::new();
        endpoint
            .documents
            .borrow_mut()
            .insert(document_id.to_string(), set);
        endpoint
    }

    pub fn stored(&self, document_id: &str) -> Option<AnnotationSet> {
        self.documents.borrow().get(document_id).cloned()
    }
}

#[async_trait(?Send)]
impl AnnotationEndpoint for MemoryEndpoint {
    async fn fetch(&self, document_id: &str) -> Result<Option<AnnotationSet>, ClientError> {
        Ok(self.stored(document_id))
    }

    async fn store(&self, document_id: &str, set: &AnnotationSet) -> Result<(), ClientError> {
        self.documents
            .borrow_mut()
            .insert(document_id.to_string(), set.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_escapes_id() {
        assert_eq!(
            annotations_url("http://localhost:3000/", "doc-1"),
            "http://localhost:3000/pdfs/doc-1/annotations"
        );
        assert_eq!(annotations_url("", "a b/c"), "/pdfs/a%20b%2Fc/annotations");
    }

    #[test]
    fn computed_stroke_points_survive_encode_and_parse() {
        use pdfmark_shared::{PagePoint, Stroke};

        let points: Vec<PagePoint> = (1..500)
            .map(|i| PagePoint {
                x: 100.0 * (i as f64 * 0.731) / 613.0,
                y: 100.0 * (i as f64 * 1.297) / 791.0,
            })
            .collect();
        let set = AnnotationSet {
            highlights: Vec::new(),
            strokes: vec![Stroke {
                page_index: 3,
                points,
            }],
        };
        let text = serde_json::to_string(&set).unwrap();
        assert_eq!(parse_annotations(&text).unwrap(), set);
    }

    #[test]
    fn parses_server_payload() {
        let set = parse_annotations(r#"{"annotations": [], "drawings": []}"#).unwrap();
        assert!(set.is_empty());
        assert!(matches!(
            parse_annotations("<html>"),
            Err(ClientError::Decode(_))
        ));
    }
}
