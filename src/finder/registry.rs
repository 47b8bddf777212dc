use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::column::ColumnItem;
use super::context::FinderContext;
use super::error::NavigationError;

/// Data source behind one column id. Item lists may depend on where the user
/// currently is, so the finder context is passed along.
#[async_trait(?Send)]
pub trait ColumnSource {
    async fn fetch_items(&self, context: &FinderContext) -> anyhow::Result<Vec<ColumnItem>>;
}

/// Maps column ids to their data sources. Columns are registered once at
/// wiring time; the finder looks them up whenever a path segment needs a
/// column that is not attached yet.
#[derive(Default)]
pub struct ColumnRegistry {
    sources: HashMap<String, Arc<dyn ColumnSource>>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, column_id: impl Into<String>, source: Arc<dyn ColumnSource>) {
        self.sources.insert(column_id.into(), source);
    }

    pub fn lookup(&self, column_id: &str) -> Result<Arc<dyn ColumnSource>, NavigationError> {
        self.sources
            .get(column_id)
            .cloned()
            .ok_or_else(|| NavigationError::UnknownColumn(column_id.to_string()))
    }
}
