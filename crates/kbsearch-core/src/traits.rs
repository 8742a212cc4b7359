use crate::error::Result;
use crate::query::ParsedQuery;
use crate::types::Hit;

/// A read-only store that executes parsed queries.
///
/// Hits come back in the store's authoritative ranking, scores already
/// rounded. `limit` caps the number of hits; `None` means all matches.
pub trait HitSource: Send + Sync {
    /// Every field name the store's schema declares, prefix convention intact.
    fn field_names(&self) -> Vec<String>;
    fn search(&self, query: &ParsedQuery, limit: Option<usize>) -> Result<Vec<Hit>>;
}

impl<S: HitSource + ?Sized> HitSource for Box<S> {
    fn field_names(&self) -> Vec<String> {
        (**self).field_names()
    }

    fn search(&self, query: &ParsedQuery, limit: Option<usize>) -> Result<Vec<Hit>> {
        (**self).search(query, limit)
    }
}
