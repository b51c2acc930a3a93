use std::time::Duration;

/// Controls how a package is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Build time for ar and tar headers, in seconds since the epoch.
    /// `None` uses the clock when the builder is created.
    pub timestamp: Option<u64>,
    /// When true, ELF binaries and `#!` scripts get mode `0755`.
    /// When false, every file is `0644`.
    pub detect_executables: bool,
    /// Owner id written to every header.
    pub uid: u32,
    /// Group id written to every header.
    pub gid: u32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            timestamp: None,
            detect_executables: true,
            uid: 0,
            gid: 0,
        }
    }
}

/// Order in which producer results are applied to the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinStrategy {
    /// Wait for every producer, then apply in registration order.
    /// Tar entry order is stable across runs.
    #[default]
    Barrier,
    /// Apply each result as it arrives.
    Streaming,
}

/// Controls how the aggregator waits on producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregatorConfig {
    pub strategy: JoinStrategy,
    /// Upper bound on the whole join. `None` waits indefinitely.
    pub deadline: Option<Duration>,
}
