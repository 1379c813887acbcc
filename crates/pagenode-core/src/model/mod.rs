pub mod ids;
pub mod node;
pub mod payload;
pub mod translation;
pub mod version;

pub use ids::{EntityKind, NodeId, PayloadId, TranslationId, VersionId};
pub use node::Node;
pub use payload::Payload;
pub use translation::{slugify, NodeTranslation};
pub use version::{Version, VersionType};
