/// Rendering collaborator driven by the finder. All calls are simple
/// synchronous notifications; the default implementations do nothing, so a
/// host only implements the hooks it renders.
pub trait FinderView {
    fn column_attached(&self, _column_id: &str) {}
    fn column_detached(&self, _column_id: &str) {}
    fn column_visibility(&self, _column_id: &str, _visible: bool) {}
    fn hidden_columns_marker(&self, _column_id: &str, _marked: bool) {}
    fn scroll_into_view(&self, _column_id: &str, _item_id: &str) {}
    fn focus_column(&self, _column_id: &str) {}
    fn clear_preview(&self) {}
    fn resize_preview(&self, _slots: usize) {}
}

/// View that renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl FinderView for NullView {}
