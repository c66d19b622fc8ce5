//! Fixture stages shared by the integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use pipewright::message::FaultReport;
use pipewright::stage::{ExceptionHandler, Stage, StageContext, StageError};

/// Forwards its input unchanged.
pub struct Echo;

#[async_trait]
impl Stage for Echo {
    type Input = String;
    type Output = String;
    async fn ingest(&mut self, input: String, ctx: &StageContext<String>) -> Result<(), StageError> {
        ctx.send(input);
        Ok(())
    }
}

/// Emits the length of its input, changing the payload type.
pub struct Measure;

#[async_trait]
impl Stage for Measure {
    type Input = String;
    type Output = usize;
    async fn ingest(&mut self, input: String, ctx: &StageContext<usize>) -> Result<(), StageError> {
        ctx.send(input.len());
        Ok(())
    }
}

/// Blocks each message on a shared gate so tests control when workers drain.
pub struct Gated {
    gate: Arc<Semaphore>,
}

impl Gated {
    pub fn new(gate: Arc<Semaphore>) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl Stage for Gated {
    type Input = u32;
    type Output = u32;
    async fn ingest(&mut self, input: u32, ctx: &StageContext<u32>) -> Result<(), StageError> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| StageError::transform("gate closed"))?;
        permit.forget();
        ctx.send(input);
        Ok(())
    }
}

/// Echoes everything except the payload `"boom"`, which kills the worker.
pub struct Volatile;

#[async_trait]
impl Stage for Volatile {
    type Input = String;
    type Output = String;
    async fn ingest(&mut self, input: String, ctx: &StageContext<String>) -> Result<(), StageError> {
        if input == "boom" {
            panic!("boom");
        }
        ctx.send(input);
        Ok(())
    }
}

/// Records which stage instance processed each message.
pub struct Tracker {
    instance: usize,
    log: Arc<Mutex<Vec<usize>>>,
}

#[async_trait]
impl Stage for Tracker {
    type Input = String;
    type Output = ();
    async fn ingest(&mut self, _input: String, _ctx: &StageContext<()>) -> Result<(), StageError> {
        self.log.lock().push(self.instance);
        Ok(())
    }
}

/// A factory minting numbered [`Tracker`] instances, plus the shared log
/// they all record into.
pub fn tracker_factory() -> (impl FnMut() -> Tracker + Send + 'static, Arc<Mutex<Vec<usize>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let factory_log = Arc::clone(&log);
    let mut next = 0;
    let factory = move || {
        let tracker = Tracker {
            instance: next,
            log: Arc::clone(&factory_log),
        };
        next += 1;
        tracker
    };
    (factory, log)
}

/// Fails every message; for exercising the fault path.
pub struct AlwaysFails;

#[async_trait]
impl Stage for AlwaysFails {
    type Input = String;
    type Output = String;
    async fn ingest(&mut self, input: String, _ctx: &StageContext<String>) -> Result<(), StageError> {
        Err(StageError::transform(format!("cannot process {input:?}")))
    }
}

/// Exception-handler stage that collects every report it receives.
pub struct CollectFaults {
    log: Arc<Mutex<Vec<FaultReport>>>,
}

impl CollectFaults {
    pub fn new(log: Arc<Mutex<Vec<FaultReport>>>) -> Self {
        Self { log }
    }
}

#[async_trait]
impl Stage for CollectFaults {
    type Input = FaultReport;
    type Output = ();
    async fn ingest(
        &mut self,
        input: FaultReport,
        _ctx: &StageContext<()>,
    ) -> Result<(), StageError> {
        self.log.lock().push(input);
        Ok(())
    }
}

impl ExceptionHandler for CollectFaults {}
