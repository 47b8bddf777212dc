use std::collections::BTreeSet;

/// One entry of a finder column: an id, display metadata, and an optional
/// pointer to the column it opens when selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnItem {
    id: String,
    display: String,
    next_column: Option<String>,
}

impl ColumnItem {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display: id.clone(),
            id,
            next_column: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    pub fn with_next_column(mut self, column: impl Into<String>) -> Self {
        self.next_column = Some(column.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn next_column(&self) -> Option<&str> {
        self.next_column.as_deref()
    }
}

/// How re-fetching a column treats the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    RestoreSelection,
    ClearSelection,
}

/// A live column of the finder: its items, the selected item (zero or one),
/// the pin-set, an optional filter, and the visibility bookkeeping of the
/// column window. Columns scrolled out of the window are hidden, never
/// destroyed, so revealing them needs no refetch.
#[derive(Debug)]
pub struct FinderColumn {
    id: String,
    items: Vec<ColumnItem>,
    selected: Option<String>,
    pinned: BTreeSet<String>,
    filter: Option<String>,
    visible: bool,
    hidden_marker: bool,
}

impl FinderColumn {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            items: Vec::new(),
            selected: None,
            pinned: BTreeSet::new(),
            filter: None,
            visible: true,
            hidden_marker: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replaces the column's items. The selection survives only if the
    /// selected id is still present.
    pub fn set_items(&mut self, items: Vec<ColumnItem>) {
        self.items = items;
        if let Some(selected) = &self.selected {
            if !self.items.iter().any(|item| item.id() == *selected) {
                self.selected = None;
            }
        }
    }

    pub fn items(&self) -> &[ColumnItem] {
        &self.items
    }

    /// Items surviving the current filter; pinned items stay visible
    /// regardless of filtering.
    pub fn visible_items(&self) -> Vec<&ColumnItem> {
        match &self.filter {
            None => self.items.iter().collect(),
            Some(filter) => self
                .items
                .iter()
                .filter(|item| {
                    self.pinned.contains(item.id()) || item.display().contains(filter.as_str())
                })
                .collect(),
        }
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.items.iter().any(|item| item.id() == item_id)
    }

    pub fn item(&self, item_id: &str) -> Option<&ColumnItem> {
        self.items.iter().find(|item| item.id() == item_id)
    }

    pub fn mark_selected(&mut self, item_id: &str) {
        if self.contains(item_id) {
            self.selected = Some(item_id.to_string());
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_item(&self) -> Option<&ColumnItem> {
        self.selected_id().and_then(|id| self.item(id))
    }

    pub fn reset_selection(&mut self) {
        self.selected = None;
    }

    pub fn pin(&mut self, item_id: &str) {
        if self.contains(item_id) {
            self.pinned.insert(item_id.to_string());
        }
    }

    pub fn unpin(&mut self, item_id: &str) {
        self.pinned.remove(item_id);
    }

    pub fn is_pinned(&self, item_id: &str) -> bool {
        self.pinned.contains(item_id)
    }

    pub fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Marks this column as the leftmost visible one with more columns
    /// hidden to its left.
    pub(crate) fn set_hidden_marker(&mut self, marked: bool) {
        self.hidden_marker = marked;
    }

    pub fn has_hidden_marker(&self) -> bool {
        self.hidden_marker
    }
}
