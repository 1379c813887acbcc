//! Node lifecycle events and the sinks that receive them

use std::sync::{Arc, Mutex};

use crate::errors::{PageNodeError, Result};
use crate::model::{NodeId, PayloadId, TranslationId, VersionId};

/// Event names dispatched by the engine and page operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeEventKind {
    PrePersist,
    PostPersist,
    PrePublish,
    PostPublish,
    PreUnpublish,
    PostUnpublish,
    PreDelete,
    PostDelete,
    DraftCreated,
    PublicVersionCreated,
    Reverted,
    AddNode,
    CopyPageTranslation,
}

impl NodeEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeEventKind::PrePersist => "pre_persist",
            NodeEventKind::PostPersist => "post_persist",
            NodeEventKind::PrePublish => "pre_publish",
            NodeEventKind::PostPublish => "post_publish",
            NodeEventKind::PreUnpublish => "pre_unpublish",
            NodeEventKind::PostUnpublish => "post_unpublish",
            NodeEventKind::PreDelete => "pre_delete",
            NodeEventKind::PostDelete => "post_delete",
            NodeEventKind::DraftCreated => "draft_created",
            NodeEventKind::PublicVersionCreated => "public_version_created",
            NodeEventKind::Reverted => "reverted",
            NodeEventKind::AddNode => "add_node",
            NodeEventKind::CopyPageTranslation => "copy_page_translation",
        }
    }

    /// Pre-events are dispatched before any write and may veto the change
    pub fn is_pre(&self) -> bool {
        matches!(
            self,
            NodeEventKind::PrePersist
                | NodeEventKind::PrePublish
                | NodeEventKind::PreUnpublish
                | NodeEventKind::PreDelete
        )
    }
}

impl std::fmt::Display for NodeEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dispatched event with the entities it concerns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEvent {
    pub kind: NodeEventKind,
    pub node_id: NodeId,
    pub translation_id: Option<TranslationId>,
    pub version_id: Option<VersionId>,
    pub payload_id: Option<PayloadId>,
}

impl NodeEvent {
    pub fn new(kind: NodeEventKind, node_id: NodeId) -> Self {
        Self {
            kind,
            node_id,
            translation_id: None,
            version_id: None,
            payload_id: None,
        }
    }

    pub fn with_translation(mut self, id: TranslationId) -> Self {
        self.translation_id = Some(id);
        self
    }

    pub fn with_version(mut self, id: VersionId) -> Self {
        self.version_id = Some(id);
        self
    }

    pub fn with_payload(mut self, id: PayloadId) -> Self {
        self.payload_id = Some(id);
        self
    }
}

/// Receiver of node events
///
/// An `Err` from a pre-event vetoes the operation before anything is written.
/// Errors from any other event are logged and ignored.
pub trait EventSink {
    /// # Errors
    ///
    /// Any error; on a pre-event it becomes `EventVetoed`.
    fn notify(&self, event: &NodeEvent) -> Result<()>;
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn notify(&self, _event: &NodeEvent) -> Result<()> {
        Ok(())
    }
}

/// Emits every event as a `tracing` debug line
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn notify(&self, event: &NodeEvent) -> Result<()> {
        tracing::debug!(
            node_event = event.kind.as_str(),
            node_id = event.node_id.get(),
            translation_id = event.translation_id.map(|id| id.get()),
            version_id = event.version_id.map(|id| id.get()),
            "node event"
        );
        Ok(())
    }
}

/// Records events in dispatch order; clones share the buffer
#[derive(Debug, Clone, Default)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<NodeEvent>>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NodeEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// `(kind, node_id)` pairs in dispatch order
    pub fn sequence(&self) -> Vec<(NodeEventKind, NodeId)> {
        self.events()
            .into_iter()
            .map(|e| (e.kind, e.node_id))
            .collect()
    }

    pub fn kinds(&self) -> Vec<NodeEventKind> {
        self.events().into_iter().map(|e| e.kind).collect()
    }

    pub fn clear(&self) {
        self.events.lock().map(|mut e| e.clear()).ok();
    }
}

impl EventSink for RecordingEventSink {
    fn notify(&self, event: &NodeEvent) -> Result<()> {
        self.events
            .lock()
            .map(|mut events| events.push(event.clone()))
            .ok();
        Ok(())
    }
}

/// Rejects every event (for tests that verify a veto stops all writes)
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllEventSink;

impl EventSink for DenyAllEventSink {
    fn notify(&self, event: &NodeEvent) -> Result<()> {
        Err(PageNodeError::EventVetoed {
            event: event.kind.as_str().to_string(),
            reason: "DenyAll event sink".to_string(),
        })
    }
}

/// Dispatch a pre-event, turning a sink error into a veto
pub(crate) fn dispatch_pre(sink: &dyn EventSink, event: NodeEvent) -> Result<()> {
    debug_assert!(event.kind.is_pre(), "{} is not a pre-event", event.kind);
    sink.notify(&event).map_err(|err| match err {
        vetoed @ PageNodeError::EventVetoed { .. } => vetoed,
        other => PageNodeError::EventVetoed {
            event: event.kind.as_str().to_string(),
            reason: other.to_string(),
        },
    })
}

/// Dispatch a notification event; failures are logged and swallowed
pub(crate) fn dispatch_post(sink: &dyn EventSink, event: NodeEvent) {
    debug_assert!(!event.kind.is_pre(), "{} cannot be fire-and-forget", event.kind);
    if let Err(err) = sink.notify(&event) {
        tracing::warn!(
            node_event = event.kind.as_str(),
            node_id = event.node_id.get(),
            error = %err,
            "event sink failed; ignoring"
        );
    }
}
