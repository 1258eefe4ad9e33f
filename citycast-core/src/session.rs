use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    error::ResolutionError,
    geolocation::GeolocationSource,
    model::{LocationQuery, Resolution},
    resolver::QueryResolver,
    view::{Effect, Generation, ViewState, ViewStateMachine},
};

#[derive(Debug)]
struct Completion {
    generation: Generation,
    result: Result<Resolution, ResolutionError>,
}

/// Drives a [`ViewStateMachine`] with resolutions running on the tokio runtime.
///
/// Queries are never cancelled. Each one reports back tagged with the
/// generation it was submitted under, and the machine drops anything older
/// than the latest submission.
#[derive(Debug)]
pub struct Session {
    resolver: Arc<QueryResolver>,
    machine: ViewStateMachine,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    locate_timeout: Duration,
    mounted: bool,
}

impl Session {
    pub fn new(resolver: Arc<QueryResolver>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let locate_timeout = resolver.timeout();
        Self {
            resolver,
            machine: ViewStateMachine::new(),
            tx,
            rx,
            locate_timeout,
            mounted: false,
        }
    }

    pub fn with_locate_timeout(mut self, timeout: Duration) -> Self {
        self.locate_timeout = timeout;
        self
    }

    pub fn state(&self) -> &ViewState {
        self.machine.state()
    }

    /// Ask `geo` for a position once and submit it. Later calls do nothing.
    ///
    /// A declined, missing or slow position leaves the session idle.
    pub async fn mount(&mut self, geo: &dyn GeolocationSource) -> Option<Generation> {
        if self.mounted {
            return None;
        }
        self.mounted = true;

        match tokio::time::timeout(self.locate_timeout, geo.locate()).await {
            Ok(Some(position)) => Some(self.submit(LocationQuery::Coordinates(position))),
            Ok(None) => {
                debug!("no position available, waiting for manual input");
                None
            }
            Err(_) => {
                debug!("geolocation did not answer in time, waiting for manual input");
                None
            }
        }
    }

    /// Move to loading and start resolving `query` in the background.
    pub fn submit(&mut self, query: LocationQuery) -> Generation {
        let generation = self.machine.submit();
        let resolver = Arc::clone(&self.resolver);
        let tx = self.tx.clone();

        let task = tokio::spawn(async move { resolver.resolve(&query).await });

        tokio::spawn(async move {
            let result = task.await.unwrap_or_else(|err| {
                warn!(generation, error = %err, "lookup task failed");
                Err(ResolutionError::ProviderUnreachable(format!(
                    "lookup task failed: {err}"
                )))
            });
            // The receiver lives as long as the session.
            let _ = tx.send(Completion { generation, result });
        });

        generation
    }

    /// Apply the next completion to arrive, stale or not.
    pub async fn pump(&mut self) -> Effect {
        match self.rx.recv().await {
            Some(completion) => self.machine.complete(completion.generation, completion.result),
            None => Effect::None,
        }
    }

    /// Wait until the latest submission has been applied.
    pub async fn settle(&mut self) -> &ViewState {
        while self.machine.is_loading() {
            self.pump().await;
        }
        self.machine.state()
    }

    pub fn toggle_forecast(&mut self) -> Effect {
        self.machine.toggle_forecast()
    }
}
