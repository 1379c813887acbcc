use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a node in the page tree
    NodeId
);
entity_id!(
    /// Identifier of a per-locale node translation
    TranslationId
);
entity_id!(
    /// Identifier of a version record
    VersionId
);
entity_id!(
    /// Identifier of a content payload snapshot
    PayloadId
);

/// Entity families with their own id sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Node,
    Translation,
    Version,
    Payload,
}

impl EntityKind {
    /// Stable name, used as the sequence key by persistent repositories
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Translation => "translation",
            EntityKind::Version => "version",
            EntityKind::Payload => "payload",
        }
    }
}
