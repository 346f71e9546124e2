use std::sync::Arc;

use crate::subscribers::{Subscribe, SubscriberSet};

use super::config::ProgramConfig;
use super::program::Program;
use super::spawn::{Spawn, TokioSpawner};

/// Builder for constructing a [`Program`] with optional features.
pub struct ProgramBuilder {
    cfg: ProgramConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    spawner: Arc<dyn Spawn>,
}

impl ProgramBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: ProgramConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            spawner: Arc::new(TokioSpawner),
        }
    }

    /// Sets snapshot subscribers attached from the start.
    ///
    /// More can be attached later with [`Program::subscribe`]. Subscribers
    /// receive selection snapshots and error reports through dedicated workers
    /// with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the executor used for [`Action::spawn`](crate::Action::spawn) futures.
    ///
    /// Defaults to [`TokioSpawner`] (the runtime current when the action fires).
    pub fn with_spawner(mut self, spawner: impl Spawn) -> Self {
        self.spawner = Arc::new(spawner);
        self
    }

    /// Builds the program.
    ///
    /// # Panics
    /// With a non-empty subscriber list this must be called inside a Tokio
    /// runtime, since subscriber workers are spawned here.
    pub fn build(self) -> Program {
        let subs = SubscriberSet::new(self.subscribers, self.cfg.snapshot_capacity_clamped());
        Program::from_parts(self.cfg, subs, self.spawner)
    }
}
