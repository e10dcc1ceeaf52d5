use std::path::Path;

use crate::error::Result;

/// Turns one file into text. Implementations must not touch shared state.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String>;
}

impl<T: TextExtractor + ?Sized> TextExtractor for std::sync::Arc<T> {
    fn extract(&self, path: &Path) -> Result<String> { (**self).extract(path) }
}
