pub mod importer;
pub mod normalize;

pub use importer::{import_file, ImportError, ImportResult, ListingStore};
