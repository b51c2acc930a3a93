//! webOS ipk assembly.
//!
//! This is the orchestration layer of ipkpack. Producers hand finished
//! `path -> bytes` maps for their namespace to an [`Aggregator`]; once every
//! producer has reported, the maps land in an [`IpkBuilder`], which renders:
//! - `debian-binary` with the format version `2.0\n`
//! - `control.tar.gz` holding the `control` file
//! - `data.tar.gz` holding every namespace tree plus `packageinfo.json`
//!
//! The three members are wrapped in a Debian `ar` container.

pub mod aggregator;
pub mod builder;
pub mod config;
pub mod control;
pub mod error;
pub mod metadata;
pub mod namespace;
pub mod sniff;

pub use aggregator::{Aggregator, AssetSink};
pub use builder::{
    Assets, IpkBuilder, CONTROL_MEMBER, DATA_MEMBER, DEBIAN_BINARY, DEBIAN_BINARY_MEMBER,
};
pub use config::{AggregatorConfig, BuilderConfig, JoinStrategy};
pub use control::ControlSection;
pub use error::{IpkError, Result};
pub use metadata::{to_tab_pretty_json, PackageInfo, PackageMetadata};
pub use namespace::{Namespace, NamespaceKind, NamespaceRegistry};
pub use sniff::{file_mode, is_executable};
