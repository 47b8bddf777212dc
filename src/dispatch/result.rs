use serde_json::Value;

/// Server process state reported through `response-headers`. A management
/// operation may leave the server needing a configuration reload or a full
/// restart before the change takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    ReloadRequired,
    RestartRequired,
}

impl ProcessState {
    pub(crate) fn from_wire(value: &str) -> Self {
        match value {
            "reload-required" => ProcessState::ReloadRequired,
            "restart-required" => ProcessState::RestartRequired,
            _ => ProcessState::Running,
        }
    }
}

/// Result of one step inside a composite exchange.
#[derive(Debug, Clone)]
pub struct StepResult {
    result: Option<Value>,
    failure: Option<String>,
}

impl StepResult {
    pub(crate) fn success(result: Option<Value>) -> Self {
        Self {
            result,
            failure: None,
        }
    }

    pub(crate) fn failure(description: String) -> Self {
        Self {
            result: None,
            failure: Some(description),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn failure_description(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}

/// Demultiplexed result of a composite: one entry per operation, in the
/// composite's order. A parsed composite may contain failing steps — logical
/// partial failure is representable and distinct from a transport failure.
#[derive(Debug, Clone)]
pub struct CompositeResult {
    steps: Vec<StepResult>,
}

impl CompositeResult {
    pub(crate) fn new(steps: Vec<StepResult>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&StepResult> {
        self.steps.get(index)
    }

    pub fn steps(&self) -> impl Iterator<Item = &StepResult> {
        self.steps.iter()
    }

    /// True when no step reported a failure.
    pub fn all_succeeded(&self) -> bool {
        self.steps.iter().all(|step| !step.is_failure())
    }
}

impl<'a> IntoIterator for &'a CompositeResult {
    type Item = &'a StepResult;
    type IntoIter = std::slice::Iter<'a, StepResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
