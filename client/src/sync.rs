use std::cell::RefCell;

use async_trait::async_trait;
use pdfmark_shared::AnnotationSet;

use crate::error::ClientError;
use crate::state::State;

/// Persistence boundary: an opaque key/value store keyed by document id.
#[async_trait(?Send)]
pub trait AnnotationEndpoint {
    /// `Ok(None)` when nothing has been stored for the document yet.
    async fn fetch(&self, document_id: &str) -> Result<Option<AnnotationSet>, ClientError>;

    /// Overwrites whatever is stored for the document.
    async fn store(&self, document_id: &str, set: &AnnotationSet) -> Result<(), ClientError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncStatus {
    Closed,
    Loading,
    Ready,
}

/// Identifies one load request. Responses are applied only if the ticket is still current.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub document_id: String,
    seq: u64,
}

/// Full snapshot of the set, taken when the user asked to save.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveRequest {
    pub document_id: String,
    pub set: AnnotationSet,
}

/// User-facing result of a load or save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Saved,
    SaveFailed(String),
    LoadFailed(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Saved => "Annotations saved successfully!".to_string(),
            Notice::SaveFailed(reason) => format!("Failed to save annotations: {reason}"),
            Notice::LoadFailed(reason) => format!("Failed to load annotations: {reason}"),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Saved)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// The response belongs to a document (or request) that is no longer current.
    Stale,
    Failed(Notice),
}

pub struct SyncController {
    document_id: Option<String>,
    status: SyncStatus,
    load_seq: u64,
}

impl Default for SyncController {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncController {
    pub fn new() -> Self {
        Self {
            document_id: None,
            status: SyncStatus::Closed,
            load_seq: 0,
        }
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    fn start_load(&mut self, document_id: &str) -> LoadTicket {
        self.load_seq += 1;
        self.document_id = Some(document_id.to_string());
        self.status = SyncStatus::Loading;
        LoadTicket {
            document_id: document_id.to_string(),
            seq: self.load_seq,
        }
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.status == SyncStatus::Loading
            && ticket.seq == self.load_seq
            && self.document_id.as_deref() == Some(ticket.document_id.as_str())
    }

    fn close(&mut self) {
        self.load_seq += 1;
        self.document_id = None;
        self.status = SyncStatus::Closed;
    }
}

/// Resets the viewer for `document_id` and returns the ticket its load response must carry.
pub fn open_document(state: &mut State, document_id: &str) -> LoadTicket {
    state.reset_document();
    let ticket = state.sync.start_load(document_id);
    log::debug!("loading annotations for {document_id}");
    ticket
}

pub fn complete_load(
    state: &mut State,
    ticket: LoadTicket,
    result: Result<Option<AnnotationSet>, ClientError>,
) -> LoadOutcome {
    if !state.sync.is_current(&ticket) {
        log::debug!("discarding stale annotations for {}", ticket.document_id);
        return LoadOutcome::Stale;
    }
    state.sync.status = SyncStatus::Ready;
    match result {
        Ok(set) => {
            let set = set.unwrap_or_default();
            log::info!(
                "loaded {} highlights and {} strokes for {}",
                set.highlights.len(),
                set.strokes.len(),
                ticket.document_id
            );
            state.store.replace(set);
            LoadOutcome::Applied
        }
        Err(error) => {
            log::warn!("loading annotations for {} failed: {error}", ticket.document_id);
            LoadOutcome::Failed(Notice::LoadFailed(error.to_string()))
        }
    }
}

/// Snapshot for a full-replace save, or `None` if there is nothing safe to save yet.
pub fn begin_save(state: &State) -> Option<SaveRequest> {
    if state.sync.status() != SyncStatus::Ready {
        return None;
    }
    let document_id = state.sync.document_id()?.to_string();
    Some(SaveRequest {
        document_id,
        set: state.store.snapshot(),
    })
}

/// The store is never touched here; a failed save can be retried as is.
pub fn complete_save(request: &SaveRequest, result: Result<(), ClientError>) -> Notice {
    match result {
        Ok(()) => {
            log::info!("saved annotations for {}", request.document_id);
            Notice::Saved
        }
        Err(error) => {
            log::warn!("saving annotations for {} failed: {error}", request.document_id);
            Notice::SaveFailed(error.to_string())
        }
    }
}

pub fn close_document(state: &mut State) {
    state.reset_document();
    state.sync.close();
}

/// Fetches the set for an already opened ticket and applies it if the ticket is still current.
pub async fn finish_load(
    state: &RefCell<State>,
    endpoint: &dyn AnnotationEndpoint,
    ticket: LoadTicket,
) -> LoadOutcome {
    let result = endpoint.fetch(&ticket.document_id).await;
    complete_load(&mut state.borrow_mut(), ticket, result)
}

pub async fn load_document(
    state: &RefCell<State>,
    endpoint: &dyn AnnotationEndpoint,
    document_id: &str,
) -> LoadOutcome {
    let ticket = open_document(&mut state.borrow_mut(), document_id);
    finish_load(state, endpoint, ticket).await
}

pub async fn save_document(
    state: &RefCell<State>,
    endpoint: &dyn AnnotationEndpoint,
) -> Option<Notice> {
    let request = begin_save(&state.borrow())?;
    let result = endpoint.store(&request.document_id, &request.set).await;
    Some(complete_save(&request, result))
}
