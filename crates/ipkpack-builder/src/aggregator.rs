use std::collections::HashSet;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::builder::{Assets, IpkBuilder};
use crate::config::{AggregatorConfig, JoinStrategy};
use crate::error::{IpkError, Result};
use crate::namespace::Namespace;

enum Outcome {
    Ready(Assets),
    Failed(String),
    Dropped,
}

type Completion = (usize, Outcome);

/// Join point for namespace producers.
///
/// Every registered namespace gets one [`AssetSink`]. [`Aggregator::join`]
/// waits until each sink has reported exactly once, then feeds the asset
/// maps into an [`IpkBuilder`].
pub struct Aggregator {
    config: AggregatorConfig,
    namespaces: Vec<Namespace>,
    ids: HashSet<String>,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl Aggregator {
    /// Create an aggregator with default configuration.
    pub fn new() -> Self {
        Self::with_config(AggregatorConfig::default())
    }

    /// Create an aggregator with explicit configuration.
    pub fn with_config(config: AggregatorConfig) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            config,
            namespaces: Vec::new(),
            ids: HashSet::new(),
            tx,
            rx,
        }
    }

    /// Register a producer and return the sink it reports through.
    pub fn register(&mut self, namespace: Namespace) -> Result<AssetSink> {
        if !self.ids.insert(namespace.id.clone()) {
            return Err(IpkError::DuplicateNamespace(namespace.id));
        }

        let index = self.namespaces.len();
        self.namespaces.push(namespace.clone());
        debug!(namespace = %namespace, index, "registered producer");
        Ok(AssetSink {
            namespace,
            index,
            tx: Some(self.tx.clone()),
        })
    }

    /// Registered namespaces in registration order.
    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Wait for every producer and add its assets to `builder`.
    ///
    /// The first failure to arrive aborts the join. With
    /// [`JoinStrategy::Barrier`] nothing reaches the builder until all
    /// producers have reported; with [`JoinStrategy::Streaming`] results are
    /// applied as they arrive.
    pub async fn join(self, builder: &mut IpkBuilder) -> Result<()> {
        let Self {
            config,
            namespaces,
            tx,
            mut rx,
            ..
        } = self;
        drop(tx);

        let mut slots: Vec<Option<Assets>> = namespaces.iter().map(|_| None).collect();
        let mut reported = vec![false; namespaces.len()];
        // Committed to `builder` only once every namespace has been applied.
        let mut staged = builder.clone();

        let collected = {
            let pending = collect(
                &mut rx,
                &namespaces,
                &mut slots,
                &mut reported,
                &mut staged,
                config.strategy,
            );
            match config.deadline {
                Some(deadline) => match tokio::time::timeout(deadline, pending).await {
                    Ok(result) => result,
                    Err(_) => Err(IpkError::DeadlineExceeded {
                        deadline,
                        pending: Vec::new(),
                    }),
                },
                None => pending.await,
            }
        };

        if let Err(IpkError::DeadlineExceeded { deadline, .. }) = collected {
            let pending = namespaces
                .iter()
                .zip(&reported)
                .filter(|(_, done)| !**done)
                .map(|(namespace, _)| namespace.id.clone())
                .collect();
            return Err(IpkError::DeadlineExceeded { deadline, pending });
        }
        collected?;

        if config.strategy == JoinStrategy::Barrier {
            for (namespace, slot) in namespaces.iter().zip(slots) {
                if let Some(assets) = slot {
                    staged.add_entries(namespace, &assets)?;
                }
            }
        }

        *builder = staged;
        info!(producers = namespaces.len(), "all producers joined");
        Ok(())
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

async fn collect(
    rx: &mut UnboundedReceiver<Completion>,
    namespaces: &[Namespace],
    slots: &mut [Option<Assets>],
    reported: &mut [bool],
    builder: &mut IpkBuilder,
    strategy: JoinStrategy,
) -> Result<()> {
    let mut remaining = namespaces.len();
    while remaining > 0 {
        let Some((index, outcome)) = rx.recv().await else {
            let missing = reported.iter().position(|done| !done).unwrap_or_default();
            return Err(IpkError::ProducerDropped(namespaces[missing].id.clone()));
        };
        let namespace = &namespaces[index];
        reported[index] = true;
        remaining -= 1;

        match outcome {
            Outcome::Ready(assets) => {
                debug!(namespace = %namespace, assets = assets.len(), remaining, "producer reported");
                match strategy {
                    JoinStrategy::Barrier => slots[index] = Some(assets),
                    JoinStrategy::Streaming => builder.add_entries(namespace, &assets)?,
                }
            }
            Outcome::Failed(message) => {
                return Err(IpkError::ProducerFailed {
                    namespace: namespace.id.clone(),
                    message,
                });
            }
            Outcome::Dropped => return Err(IpkError::ProducerDropped(namespace.id.clone())),
        }
    }
    Ok(())
}

/// Producer-side handle for one namespace.
///
/// Consumed by [`complete`](Self::complete) or [`fail`](Self::fail).
/// Dropping it unreported fails the join with
/// [`IpkError::ProducerDropped`].
pub struct AssetSink {
    namespace: Namespace,
    index: usize,
    tx: Option<UnboundedSender<Completion>>,
}

impl AssetSink {
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Hand over the finished asset map.
    pub fn complete(mut self, assets: Assets) -> Result<()> {
        self.send(Outcome::Ready(assets))
    }

    /// Report that this producer could not produce its assets.
    pub fn fail(mut self, message: impl Into<String>) -> Result<()> {
        self.send(Outcome::Failed(message.into()))
    }

    fn send(&mut self, outcome: Outcome) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.send((self.index, outcome))
                .map_err(|_| IpkError::AggregatorClosed(self.namespace.id.clone()))?;
        }
        Ok(())
    }
}

impl Drop for AssetSink {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send((self.index, Outcome::Dropped));
        }
    }
}

impl std::fmt::Debug for AssetSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetSink")
            .field("namespace", &self.namespace)
            .field("index", &self.index)
            .finish()
    }
}
