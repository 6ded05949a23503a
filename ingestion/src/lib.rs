pub mod extract;
pub mod importer;
pub mod resolver;
pub mod scan;

pub use importer::{Category, GraphImporter, ImportError, ImportReport};
pub use resolver::{ReferenceResolver, ResolveError};
