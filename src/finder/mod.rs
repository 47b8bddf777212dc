//! The finder: a multi-column, path-addressable, asynchronously populated
//! navigation browser and its underlying state machine.
//!
//! One finder instance is shared across all top-level categories; a
//! [`FinderPath`] addresses where the user is, and selecting or refreshing a
//! path compiles one flow task per segment. Rendering and history are
//! collaborator seams ([`FinderView`], [`HistoryStore`]).

pub mod column;
pub mod context;
pub mod error;
#[allow(clippy::module_inception)]
pub mod finder;
pub mod history;
pub mod machine;
pub mod path;
pub mod registry;
pub mod view;

pub use column::{ColumnItem, FinderColumn, RefreshMode};
pub use context::{ContextListener, FinderContext};
pub use error::NavigationError;
pub use finder::{Finder, SelectOutcome, MAX_VISIBLE_COLUMNS};
pub use history::{HistoryEntry, HistoryStore, InMemoryHistory};
pub use machine::{FinderLifecycle, Lifecycle, LifecycleEvent};
pub use path::{FinderPath, FinderSegment, PathParseError};
pub use registry::{ColumnRegistry, ColumnSource};
pub use view::{FinderView, NullView};
