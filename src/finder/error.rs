use thiserror::Error;

/// Failures while resolving or populating finder columns. A stale target path
/// (item id missing from its resolved column) is not represented here — it
/// aborts the selection pipeline and is recovered by the finder itself.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("no column registered for id '{0}'")]
    UnknownColumn(String),
    #[error("failed to load items for column '{column}': {source}")]
    Fetch {
        column: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
