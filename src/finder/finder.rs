use std::collections::HashMap;

use async_trait::async_trait;
use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

use super::column::{FinderColumn, RefreshMode};
use super::context::{ContextListener, FinderContext};
use super::error::NavigationError;
use super::history::{HistoryEntry, HistoryStore};
use super::machine::Lifecycle;
use super::path::{FinderPath, FinderSegment};
use super::registry::ColumnRegistry;
use super::view::FinderView;
use crate::flow::{self, Abort, FlowTask, NoProgress, Progress, TaskResult};

/// Maximum number of simultaneously visible columns. Further columns are
/// hidden from the left, not destroyed.
pub const MAX_VISIBLE_COLUMNS: usize = 4;

/// Grid slots shared between columns and the preview area.
const MAX_COLUMNS: usize = 12;

/// How a [`Finder::select`] call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Every segment of the target path resolved.
    Selected,
    /// The target path was empty, or it was stale and there was no current
    /// path to fall back on; the caller's fallback ran.
    FallbackInvoked,
    /// The target path was stale; the furthest resolved column was focused.
    Recovered { focused: Option<String> },
}

/// The multi-column, path-addressable navigation state machine.
///
/// One finder instance is shared across all top-level categories; only the
/// columns change while navigating. Selection and refresh compile the path
/// into flow tasks — one per segment — and run them as a series pipeline.
/// All state is touched from the single event loop; calls take `&mut self`,
/// which statically serializes overlapping navigation on one instance.
pub struct Finder {
    registry: ColumnRegistry,
    history: Box<dyn HistoryStore>,
    view: Box<dyn FinderView>,
    progress: Box<dyn Fn() -> Box<dyn Progress>>,
    context: FinderContext,
    lifecycle: Lifecycle,
    columns: IndexMap<String, FinderColumn>,
    initial_columns: HashMap<String, String>,
    listeners: Vec<Box<dyn ContextListener>>,
    max_visible: usize,
}

struct NavigationContext<'f> {
    finder: &'f mut Finder,
    /// Column ids resolved so far, furthest last. Each task pushes the column
    /// it resolved for the next segment to build on.
    resolved: Vec<String>,
}

/// Selects one path segment: ensures the column is attached (fetching items
/// only when newly appended), asserts the item exists, marks it selected.
struct SelectSegmentTask {
    segment: FinderSegment,
}

#[async_trait(?Send)]
impl<'f> FlowTask<NavigationContext<'f>> for SelectSegmentTask {
    async fn run(&mut self, ctx: &mut NavigationContext<'f>) -> TaskResult {
        let column_id = self.segment.column();
        let item_id = self.segment.item();
        if !ctx.finder.columns.contains_key(column_id) {
            ctx.finder.append_column(column_id).await.map_err(|err| {
                error!(column = column_id, "unable to append column");
                Abort::caused_by(format!("unable to append column '{column_id}'"), err)
            })?;
        }
        ctx.finder.select_item(column_id, item_id)?;
        ctx.resolved.push(column_id.to_string());
        Ok(())
    }
}

/// Refreshes one path segment in place: re-fetches the column if it exists,
/// appends it if it does not, then re-selects the same item.
struct RefreshSegmentTask {
    segment: FinderSegment,
}

#[async_trait(?Send)]
impl<'f> FlowTask<NavigationContext<'f>> for RefreshSegmentTask {
    async fn run(&mut self, ctx: &mut NavigationContext<'f>) -> TaskResult {
        let column_id = self.segment.column();
        let item_id = self.segment.item();
        if ctx.finder.columns.contains_key(column_id) {
            // Existing column: replace the items, leave the visibility and
            // hidden-column bookkeeping untouched.
            ctx.finder.refetch_items(column_id).await.map_err(|err| {
                Abort::caused_by(format!("unable to refresh column '{column_id}'"), err)
            })?;
        } else {
            ctx.finder.append_column(column_id).await.map_err(|err| {
                Abort::caused_by(format!("unable to append column '{column_id}'"), err)
            })?;
        }
        ctx.finder.select_item(column_id, item_id)?;
        ctx.resolved.push(column_id.to_string());
        Ok(())
    }
}

impl Finder {
    pub fn new(
        registry: ColumnRegistry,
        history: Box<dyn HistoryStore>,
        view: Box<dyn FinderView>,
    ) -> Self {
        Self {
            registry,
            history,
            view,
            progress: Box::new(|| Box::new(NoProgress)),
            context: FinderContext::default(),
            lifecycle: Lifecycle::new(),
            columns: IndexMap::new(),
            initial_columns: HashMap::new(),
            listeners: Vec::new(),
            max_visible: MAX_VISIBLE_COLUMNS,
        }
    }

    /// Installs the progress indicator created for each pipeline run.
    pub fn with_progress(mut self, progress: impl Fn() -> Box<dyn Progress> + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn with_max_visible(mut self, max_visible: usize) -> Self {
        self.max_visible = max_visible.max(1);
        self
    }

    pub fn add_context_listener(&mut self, listener: Box<dyn ContextListener>) {
        self.listeners.push(listener);
    }

    pub fn context(&self) -> &FinderContext {
        &self.context
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    pub fn column(&self, column_id: &str) -> Option<&FinderColumn> {
        self.columns.get(column_id)
    }

    pub fn column_mut(&mut self, column_id: &str) -> Option<&mut FinderColumn> {
        self.columns.get_mut(column_id)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn visible_column_count(&self) -> usize {
        self.columns
            .values()
            .filter(|column| column.is_visible())
            .count()
    }

    /// Grid slots left for the preview area next to the visible columns.
    pub fn preview_slots(&self) -> usize {
        MAX_COLUMNS - 2 * self.visible_column_count().min(self.max_visible)
    }

    // ------------------------------------------------------ public API

    /// Resets the finder to the initial state of the given token: all columns
    /// are discarded and the token's initial column is appended and fetched.
    pub async fn reset(
        &mut self,
        token: &str,
        initial_column: &str,
    ) -> Result<(), NavigationError> {
        info!(token, initial_column, "resetting finder");
        self.initial_columns
            .insert(token.to_string(), initial_column.to_string());
        self.reduce_all();
        self.context.reset(token);
        self.lifecycle.activate(token);
        self.append_column(initial_column).await?;
        self.view.focus_column(initial_column);
        self.view.clear_preview();
        self.update_context();
        self.update_history();
        Ok(())
    }

    /// Shows the finder for the given token and selects columns and items
    /// along the path, reusing every column up to the deepest one shared with
    /// the current path. An empty path runs the fallback instead; a stale
    /// path ends in recovery or — without a current path — the fallback.
    pub async fn select(
        &mut self,
        token: &str,
        path: FinderPath,
        fallback: impl FnOnce(&mut Finder),
    ) -> SelectOutcome {
        if path.is_empty() {
            debug!(token, "empty path, running fallback");
            fallback(self);
            return SelectOutcome::FallbackInvoked;
        }

        if !self.lifecycle.is_active() || self.context.token() != Some(token) {
            // Different top-level category: every segment must be rebuilt.
            self.context.reset(token);
            self.lifecycle.activate(token);
            self.reduce_all();
        } else {
            // Clear the preview right away, otherwise the previous (wrong)
            // preview stays visible until all segment tasks have finished.
            self.view.clear_preview();
            let keep = match self.last_common_column(&path) {
                Some(column_id) => self.columns.contains_key(&column_id).then_some(column_id),
                None => self
                    .initial_columns
                    .get(token)
                    .filter(|column_id| self.columns.contains_key(*column_id))
                    .cloned(),
            };
            if let Some(column_id) = keep {
                self.reduce_to(&column_id);
            }
        }

        let mut progress = (self.progress)();

        let (result, resolved) = {
            let mut tasks: Vec<Box<dyn FlowTask<NavigationContext<'_>>>> = path
                .segments()
                .map(|segment| {
                    Box::new(SelectSegmentTask {
                        segment: segment.clone(),
                    }) as Box<dyn FlowTask<NavigationContext<'_>>>
                })
                .collect();
            let mut ctx = NavigationContext {
                finder: self,
                resolved: Vec::new(),
            };
            let result = flow::series(progress.as_mut(), &mut ctx, &mut tasks).await;
            (result, ctx.resolved)
        };

        match result {
            Ok(()) => {
                if let Some(last) = resolved.last().cloned() {
                    self.view.focus_column(&last);
                    if let Err(err) = self.refresh_column(&last, RefreshMode::RestoreSelection).await
                    {
                        warn!(column = %last, error = %err, "failed to refresh the focused column");
                    }
                    self.update_context();
                }
                self.update_history();
                SelectOutcome::Selected
            }
            Err(err) => {
                warn!(token, path = %path, error = %err, "selection pipeline failed");
                if self.context.path().is_empty() {
                    fallback(self);
                    SelectOutcome::FallbackInvoked
                } else {
                    let focused = resolved.last().cloned();
                    if let Some(column_id) = &focused {
                        self.view.focus_column(column_id);
                    }
                    // Visibility bookkeeping, only needed on the error path.
                    self.mark_hidden_columns();
                    SelectOutcome::Recovered { focused }
                }
            }
        }
    }

    /// Refreshes the current path in place after an underlying resource
    /// changed without changing navigational position.
    pub async fn refresh(&mut self) -> Result<(), flow::FlowError> {
        let path = self.context.path().clone();
        self.refresh_path(path).await
    }

    /// Refreshes the given path: every existing column is re-fetched in
    /// place (scroll position and hidden-column bookkeeping preserved),
    /// missing ones are appended, and the same item ids are re-selected.
    pub async fn refresh_path(&mut self, path: FinderPath) -> Result<(), flow::FlowError> {
        if path.is_empty() || !self.lifecycle.is_active() {
            return Ok(());
        }
        debug!(path = %path, "refreshing finder path");

        let mut progress = (self.progress)();

        let (result, resolved) = {
            let mut tasks: Vec<Box<dyn FlowTask<NavigationContext<'_>>>> = path
                .segments()
                .map(|segment| {
                    Box::new(RefreshSegmentTask {
                        segment: segment.clone(),
                    }) as Box<dyn FlowTask<NavigationContext<'_>>>
                })
                .collect();
            let mut ctx = NavigationContext {
                finder: self,
                resolved: Vec::new(),
            };
            let result = flow::series(progress.as_mut(), &mut ctx, &mut tasks).await;
            (result, ctx.resolved)
        };

        match result {
            Ok(()) => {
                if let Some(last) = resolved.last() {
                    self.view.focus_column(last);
                }
                self.update_history();
                Ok(())
            }
            Err(err) => {
                warn!(path = %path, error = %err, "refresh pipeline failed");
                Err(err)
            }
        }
    }

    /// Interactive selection of an item in an attached column: deeper columns
    /// are truncated, the item is marked selected, and when it carries a
    /// next-column pointer that column is appended and fetched.
    pub async fn open(&mut self, column_id: &str, item_id: &str) -> Result<(), NavigationError> {
        let next = match self.columns.get_mut(column_id) {
            Some(column) if column.contains(item_id) => {
                column.mark_selected(item_id);
                column
                    .item(item_id)
                    .and_then(|item| item.next_column())
                    .map(str::to_string)
            }
            _ => {
                warn!(column = column_id, item = item_id, "cannot open item, not present");
                return Ok(());
            }
        };
        self.reduce_to(column_id);
        self.view.scroll_into_view(column_id, item_id);
        self.update_context();
        if let Some(next_column) = next {
            self.append_column(&next_column).await?;
        }
        self.update_history();
        Ok(())
    }

    /// Reveals the rightmost hidden column and updates the "more columns to
    /// the left" marker.
    pub fn reveal_hidden_columns(&mut self) {
        let marked: Vec<String> = self
            .columns
            .values()
            .filter(|column| column.has_hidden_marker())
            .map(|column| column.id().to_string())
            .collect();
        for column_id in marked {
            if let Some(column) = self.columns.get_mut(&column_id) {
                column.set_hidden_marker(false);
            }
            self.view.hidden_columns_marker(&column_id, false);
        }

        let last_hidden = self
            .columns
            .values()
            .filter(|column| !column.is_visible())
            .last()
            .map(|column| column.id().to_string());
        if let Some(column_id) = last_hidden {
            if let Some(column) = self.columns.get_mut(&column_id) {
                column.set_visible(true);
            }
            self.view.column_visibility(&column_id, true);
        }

        self.mark_hidden_columns();
        self.view.resize_preview(self.preview_slots());
    }

    /// Keyboard navigation hook: focuses the column left of the given one.
    pub fn select_previous_column(&mut self, column_id: &str) {
        let previous = self
            .columns
            .get_index_of(column_id)
            .filter(|index| *index > 0)
            .and_then(|index| self.columns.get_index(index - 1))
            .map(|(id, _)| id.clone());
        if let Some(previous_id) = previous {
            self.view.focus_column(&previous_id);
        }
    }

    // ------------------------------------------------------ internal API

    /// Deepest column that can be kept when navigating to `target`: the first
    /// column id, scanning both paths from the end, that appears in both.
    fn last_common_column(&self, target: &FinderPath) -> Option<String> {
        let current = self.context.path().reversed();
        for new_segment in target.reversed().segments() {
            for current_segment in current.segments() {
                if new_segment.column() == current_segment.column() {
                    return Some(new_segment.column().to_string());
                }
            }
        }
        None
    }

    async fn append_column(&mut self, column_id: &str) -> Result<(), NavigationError> {
        let source = self.registry.lookup(column_id)?;
        let items = source
            .fetch_items(&self.context)
            .await
            .map_err(|err| NavigationError::Fetch {
                column: column_id.to_string(),
                source: err.into(),
            })?;
        debug!(column = column_id, items = items.len(), "column appended");
        let mut column = FinderColumn::new(column_id);
        column.set_items(items);
        self.columns.insert(column_id.to_string(), column);
        self.view.column_attached(column_id);
        self.apply_visibility_window();
        Ok(())
    }

    /// Re-fetches an existing column's items without touching its visibility
    /// flags. The selection survives when the selected id is still present.
    async fn refetch_items(&mut self, column_id: &str) -> Result<(), NavigationError> {
        let source = self.registry.lookup(column_id)?;
        let items = source
            .fetch_items(&self.context)
            .await
            .map_err(|err| NavigationError::Fetch {
                column: column_id.to_string(),
                source: err.into(),
            })?;
        if let Some(column) = self.columns.get_mut(column_id) {
            column.set_items(items);
        }
        Ok(())
    }

    async fn refresh_column(
        &mut self,
        column_id: &str,
        mode: RefreshMode,
    ) -> Result<(), NavigationError> {
        let previous = self
            .columns
            .get(column_id)
            .and_then(|column| column.selected_id().map(str::to_string));
        self.refetch_items(column_id).await?;
        if let Some(column) = self.columns.get_mut(column_id) {
            match mode {
                RefreshMode::RestoreSelection => {
                    if let Some(item_id) = previous {
                        column.mark_selected(&item_id);
                    }
                }
                RefreshMode::ClearSelection => column.reset_selection(),
            }
        }
        Ok(())
    }

    fn select_item(&mut self, column_id: &str, item_id: &str) -> TaskResult {
        let Some(column) = self.columns.get_mut(column_id) else {
            return Err(Abort::new(format!(
                "column '{column_id}' is not attached"
            )));
        };
        if !column.contains(item_id) {
            error!(
                column = column_id,
                item = item_id,
                "unable to select item, not found in column"
            );
            return Err(Abort::new(format!(
                "unable to select item '{item_id}' in column '{column_id}'"
            )));
        }
        column.mark_selected(item_id);
        self.view.scroll_into_view(column_id, item_id);
        self.update_context();
        Ok(())
    }

    fn reduce_all(&mut self) {
        for (column_id, _) in self.columns.drain(..) {
            self.view.column_detached(&column_id);
        }
        self.view.resize_preview(self.preview_slots());
    }

    /// Truncates the column list back to (and including) the given column.
    fn reduce_to(&mut self, column_id: &str) {
        let Some(index) = self.columns.get_index_of(column_id) else {
            return;
        };
        while self.columns.len() > index + 1 {
            if let Some((removed_id, _)) = self.columns.pop() {
                self.view.column_detached(&removed_id);
            }
        }
        self.apply_visibility_window();
    }

    /// Recomputes the visible window: at most `max_visible` columns stay
    /// visible, hidden from the left, and the leftmost visible column carries
    /// the hidden-columns marker when anything is hidden.
    fn apply_visibility_window(&mut self) {
        let hide_until = self.columns.len().saturating_sub(self.max_visible);
        for (index, column) in self.columns.values_mut().enumerate() {
            let visible = index >= hide_until;
            if column.is_visible() != visible {
                column.set_visible(visible);
                self.view.column_visibility(column.id(), visible);
            }
            if column.has_hidden_marker() {
                column.set_hidden_marker(false);
                self.view.hidden_columns_marker(column.id(), false);
            }
        }
        if hide_until > 0 {
            self.mark_hidden_columns();
        }
        self.view.resize_preview(self.preview_slots());
    }

    fn mark_hidden_columns(&mut self) {
        if self.columns.values().any(|column| !column.is_visible()) {
            if let Some(column) = self.columns.values_mut().find(|column| column.is_visible()) {
                column.set_hidden_marker(true);
                self.view.hidden_columns_marker(column.id(), true);
            }
        }
    }

    /// Rebuilds the context path from the attached columns' selections and
    /// notifies the context listeners.
    fn update_context(&mut self) {
        let mut path = FinderPath::new();
        for column in self.columns.values() {
            match column.selected_id() {
                Some(item_id) => path.append(column.id(), item_id),
                None => break,
            }
        }
        self.context.set_path(path);
        for listener in &self.listeners {
            listener.on_context_updated(&self.context);
        }
    }

    /// Pushes (token, serialized path) to the history store — but only if it
    /// differs from the current entry, and never across tokens.
    fn update_history(&mut self) {
        let Some(token) = self.context.token() else {
            return;
        };
        let entry = HistoryEntry {
            token: token.to_string(),
            path: self.context.path().to_string(),
        };
        match self.history.current_entry() {
            Some(current) if current.token != entry.token => {
                debug!(
                    current = %current.token,
                    update = %entry.token,
                    "history entry belongs to a different token, not updating"
                );
            }
            Some(current) if current == entry => {}
            _ => {
                debug!(token = %entry.token, path = %entry.path, "updating history");
                self.history.push_entry(entry);
            }
        }
    }
}
