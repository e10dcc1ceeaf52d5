//! docscan-core
//!
//! Domain model, configuration, traversal, classification and aggregation for
//! the document scan pipeline. Extraction backends live in `docscan-extract`,
//! report output in `docscan-report`.
pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;
pub mod walker;

pub use aggregator::Aggregator;
pub use classifier::{Classification, KeywordClassifier};
pub use error::{Error, Result};
pub use traits::TextExtractor;
pub use types::{CategorySummary, DocumentRecord, FileKind, ScanReport};
pub use walker::FileWalker;
