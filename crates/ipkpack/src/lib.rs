//! Deterministic webOS ipk packaging.
//!
//! ipkpack turns finished per-namespace asset maps into a webOS `.ipk`: a
//! Debian `ar` container holding `debian-binary`, `control.tar.gz` and
//! `data.tar.gz`.
//!
//! # Crate Structure
//!
//! - [`ar`]: the `ar` container codec
//! - [`section`]: tar+gzip sections with synthesized directories
//! - [`builder`]: package metadata, namespaces, the ipk builder and the producer join

/// Re-export archive container types.
pub mod ar {
    pub use ipkpack_ar::*;
}

/// Re-export section types.
pub mod section {
    pub use ipkpack_section::*;
}

/// Re-export builder types.
pub mod builder {
    pub use ipkpack_builder::*;
}
