use chrono::{DateTime, TimeZone, Utc};
use pagenode_core::events::RecordingEventSink;
use pagenode_core::ops::page_ops::{self, NewPage};
use pagenode_core::{
    EngineConfig, ManualClock, NodeId, NodeTranslation, Repository, Store, VersioningEngine,
};

/// Fixed start instant shared by scenario tests
#[allow(dead_code)]
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

/// Store, pinned clock and recording event sink wired into one engine
#[allow(dead_code)]
pub struct Harness {
    pub store: Store,
    pub clock: ManualClock,
    pub events: RecordingEventSink,
    pub engine: VersioningEngine,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let clock = ManualClock::new(t0());
        let events = RecordingEventSink::new();
        let engine = VersioningEngine::new(config)
            .with_clock(clock.clone())
            .with_events(events.clone())
            .with_user("editor");
        Self {
            store: Store::new(),
            clock,
            events,
            engine,
        }
    }

    /// Create a root page in "en" and forget the events it dispatched
    pub fn root_page(&mut self, title: &str) -> NodeId {
        let created = page_ops::create_page(
            &self.engine,
            &mut self.store,
            NewPage::new("en", "page").titled(title),
        )
        .expect("root page");
        self.events.clear();
        created.node.id
    }

    /// Create a child page in "en" and forget the events it dispatched
    pub fn child_page(&mut self, parent: NodeId, title: &str) -> NodeId {
        let created = page_ops::create_page(
            &self.engine,
            &mut self.store,
            NewPage::new("en", "page").under(parent).titled(title),
        )
        .expect("child page");
        self.events.clear();
        created.node.id
    }

    pub fn translation(&self, node: NodeId) -> NodeTranslation {
        self.store
            .get_translation_for(node, "en")
            .expect("translation")
    }
}
