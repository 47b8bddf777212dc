use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One step of a finder path: a column and the item selected in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FinderSegment {
    column: String,
    item: String,
}

impl FinderSegment {
    pub fn new(column: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            item: item.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn item(&self) -> &str {
        &self.item
    }
}

impl fmt::Display for FinderSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.column, self.item)
    }
}

/// Ordered sequence of segments describing where the user currently is.
/// The empty path is a valid value and means "no selection".
///
/// Serializes as `column~item!column~item` for the history store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinderPath {
    segments: Vec<FinderSegment>,
}

impl FinderPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, column: impl Into<String>, item: impl Into<String>) {
        self.segments.push(FinderSegment::new(column, item));
    }

    /// Builder-style [`FinderPath::append`].
    pub fn with(mut self, column: impl Into<String>, item: impl Into<String>) -> Self {
        self.append(column, item);
        self
    }

    pub fn segments(&self) -> impl DoubleEndedIterator<Item = &FinderSegment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&FinderSegment> {
        self.segments.last()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Traversal order inverted; used for longest-common-column matching
    /// between a target path and the current one.
    pub fn reversed(&self) -> FinderPath {
        FinderPath {
            segments: self.segments.iter().rev().cloned().collect(),
        }
    }
}

impl FromIterator<FinderSegment> for FinderPath {
    fn from_iter<I: IntoIterator<Item = FinderSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for FinderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, "!")?;
            }
            write!(f, "{segment}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid finder path segment '{segment}'")]
pub struct PathParseError {
    segment: String,
}

impl FromStr for FinderPath {
    type Err = PathParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Ok(FinderPath::new());
        }
        let mut path = FinderPath::new();
        for part in value.split('!') {
            let (column, item) = part.split_once('~').ok_or_else(|| PathParseError {
                segment: part.to_string(),
            })?;
            path.append(column, item);
        }
        Ok(path)
    }
}
