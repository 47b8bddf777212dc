use super::path::FinderPath;

/// Per-finder navigation state: the active top-level token and the current
/// path. Mutated only by the finder itself; collaborators (breadcrumb,
/// preview) observe it through [`ContextListener`].
#[derive(Debug, Clone, Default)]
pub struct FinderContext {
    token: Option<String>,
    path: FinderPath,
}

impl FinderContext {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn path(&self) -> &FinderPath {
        &self.path
    }

    pub(crate) fn reset(&mut self, token: &str) {
        self.token = Some(token.to_string());
        self.path.clear();
    }

    pub(crate) fn set_path(&mut self, path: FinderPath) {
        self.path = path;
    }
}

/// Notified after every context update (selection change, reset, refresh).
pub trait ContextListener {
    fn on_context_updated(&self, context: &FinderContext);
}
