// Switchboard - asynchronous core of a management-console client.
// This exposes the flow engine, the operation dispatcher, the timeout poller
// and the finder navigation state machine for hosts and integration tests.

pub mod bootstrap;
pub mod config;
pub mod dispatch;
pub mod finder;
pub mod flow;
pub mod telemetry;

// Re-export key types for easy access
pub use bootstrap::{run_bootstrap, BootstrapContext, BootstrapTask, ReadEnvironment};
pub use config::{config, init_config, SwitchboardConfig};
pub use dispatch::{
    Address, Composite, CompositeResult, DispatchError, DispatchTask, Dispatcher, HttpTransport,
    ManagementTransport, OnFailure, Operation, PollOutcome, ProcessState, Session, StepResult,
    TimeoutPoller, TransportError,
};
pub use finder::{
    ColumnItem, ColumnRegistry, ColumnSource, Finder, FinderColumn, FinderContext, FinderPath,
    FinderSegment, FinderView, HistoryStore, InMemoryHistory, NullView, SelectOutcome,
};
pub use flow::{Abort, FlowError, FlowTask, NoProgress, Progress, ProgressModel, TaskResult};
pub use telemetry::{
    create_pipeline_span, generate_correlation_id, init_telemetry, shutdown_telemetry,
};
