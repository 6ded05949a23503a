pub mod config;
pub mod error;
pub mod properties;
pub mod record;
pub mod reference;
pub mod schema;
pub mod taxonomy;

pub use error::{ErrorCode, PakdumpError};
pub use properties::Properties;
pub use record::{normalize_object_name, ObjectRecord, RecordKind};
pub use reference::ObjectReference;
pub use taxonomy::Taxonomy;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
