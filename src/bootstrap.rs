//! Startup tasks executed as one pipeline before the console becomes
//! interactive. Each task is named; start and completion are logged so a
//! hanging bootstrap is easy to pin down.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::dispatch::{Address, Dispatcher, Operation};
use crate::flow::{self, Abort, FlowError, FlowTask, Progress, TaskResult};

/// Shared state of one bootstrap run.
pub struct BootstrapContext {
    dispatcher: Arc<Dispatcher>,
    /// Root resource attributes, populated by [`ReadEnvironment`].
    pub environment: Option<Value>,
}

impl BootstrapContext {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            environment: None,
        }
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }
}

/// A named bootstrap task.
#[async_trait(?Send)]
pub trait BootstrapTask: FlowTask<BootstrapContext> {
    fn name(&self) -> &str;
}

struct Logged {
    inner: Box<dyn BootstrapTask>,
}

#[async_trait(?Send)]
impl FlowTask<BootstrapContext> for Logged {
    async fn run(&mut self, ctx: &mut BootstrapContext) -> TaskResult {
        let name = self.inner.name().to_string();
        info!(task = %name, "start");
        let result = self.inner.run(ctx).await;
        if result.is_ok() {
            info!(task = %name, "done");
        }
        result
    }
}

/// Runs the bootstrap tasks strictly in order. The first aborting task stops
/// the sequence.
pub async fn run_bootstrap(
    progress: &mut dyn Progress,
    ctx: &mut BootstrapContext,
    tasks: Vec<Box<dyn BootstrapTask>>,
) -> Result<(), FlowError> {
    let mut wrapped: Vec<Box<dyn FlowTask<BootstrapContext>>> = tasks
        .into_iter()
        .map(|inner| Box::new(Logged { inner }) as Box<dyn FlowTask<BootstrapContext>>)
        .collect();
    flow::series(progress, ctx, &mut wrapped).await
}

/// Reads the root resource's attributes (including runtime values) into the
/// bootstrap context. The console needs them before the first navigation.
pub struct ReadEnvironment;

#[async_trait(?Send)]
impl FlowTask<BootstrapContext> for ReadEnvironment {
    async fn run(&mut self, ctx: &mut BootstrapContext) -> TaskResult {
        let operation = Operation::builder("read-resource", Address::root())
            .param("attributes-only", true)
            .param("include-runtime", true)
            .build();
        match ctx.dispatcher().execute(&operation).await {
            Ok(result) => {
                ctx.environment = Some(result);
                Ok(())
            }
            Err(err) => Err(Abort::caused_by(
                "unable to read the server environment",
                err,
            )),
        }
    }
}

impl BootstrapTask for ReadEnvironment {
    fn name(&self) -> &str {
        "read-environment"
    }
}
