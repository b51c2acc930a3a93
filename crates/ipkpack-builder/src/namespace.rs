use std::fmt;

use indexmap::IndexSet;
use tracing::warn;

use crate::error::{IpkError, Result};

/// Whether a namespace is the primary application or an auxiliary service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceKind {
    App,
    Service,
}

impl NamespaceKind {
    /// Directory under `usr/palm` holding namespaces of this kind.
    pub fn install_dir(self) -> &'static str {
        match self {
            Self::App => "applications",
            Self::Service => "services",
        }
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App => f.write_str("app"),
            Self::Service => f.write_str("service"),
        }
    }
}

/// One unit of packaged output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub id: String,
    pub kind: NamespaceKind,
}

impl Namespace {
    pub fn new(id: impl Into<String>, kind: NamespaceKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn app(id: impl Into<String>) -> Self {
        Self::new(id, NamespaceKind::App)
    }

    pub fn service(id: impl Into<String>) -> Self {
        Self::new(id, NamespaceKind::Service)
    }

    /// Install root inside the data section, e.g. `usr/palm/services/{id}`.
    pub fn root(&self) -> String {
        format!("usr/palm/{}/{}", self.kind.install_dir(), self.id)
    }

    /// Check that the id is a single usable path segment.
    pub fn validate(&self) -> Result<()> {
        match id_problem(&self.id) {
            Some(reason) => Err(IpkError::InvalidNamespaceId {
                id: self.id.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Why `id` cannot name a directory under `usr/palm`, if it cannot.
pub(crate) fn id_problem(id: &str) -> Option<&'static str> {
    if id.is_empty() {
        Some("id is empty")
    } else if id == "." || id == ".." {
        Some("id is a relative path segment")
    } else if id.contains(['/', '\\']) {
        Some("id contains a path separator")
    } else if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Some("id contains whitespace or control characters")
    } else {
        None
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Namespaces seen by a builder, in first-registration order.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    apps: IndexSet<String>,
    services: IndexSet<String>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a namespace. Returns false if it was already known.
    pub fn register(&mut self, namespace: &Namespace) -> bool {
        match namespace.kind {
            NamespaceKind::App => {
                let inserted = self.apps.insert(namespace.id.clone());
                if inserted && self.apps.len() > 1 {
                    warn!(
                        ignored = %namespace.id,
                        app = self.app().unwrap_or_default(),
                        "more than one app namespace registered; keeping the first"
                    );
                }
                inserted
            }
            NamespaceKind::Service => self.services.insert(namespace.id.clone()),
        }
    }

    /// The first registered app id.
    pub fn app(&self) -> Option<&str> {
        self.apps.first().map(String::as_str)
    }

    /// Service ids in registration order.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(String::as_str)
    }

    pub fn contains(&self, namespace: &Namespace) -> bool {
        match namespace.kind {
            NamespaceKind::App => self.apps.contains(&namespace.id),
            NamespaceKind::Service => self.services.contains(&namespace.id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty() && self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roots_follow_kind() {
        assert_eq!(
            Namespace::app("com.example.app").root(),
            "usr/palm/applications/com.example.app"
        );
        assert_eq!(
            Namespace::service("com.example.app.service").root(),
            "usr/palm/services/com.example.app.service"
        );
    }

    #[test]
    fn ids_must_be_single_segments() {
        assert!(Namespace::app("com.example.app").validate().is_ok());
        assert!(Namespace::service("svc-1_x+y").validate().is_ok());

        for bad in ["", ".", "..", "../../etc", "a/b", "a\\b", "has space", "line\nbreak"] {
            let err = Namespace::app(bad).validate().unwrap_err();
            assert!(
                matches!(err, IpkError::InvalidNamespaceId { ref id, .. } if id == bad),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn register_is_idempotent_and_ordered() {
        let mut registry = NamespaceRegistry::new();
        assert!(registry.register(&Namespace::service("b")));
        assert!(registry.register(&Namespace::service("a")));
        assert!(!registry.register(&Namespace::service("b")));
        assert!(registry.register(&Namespace::app("app")));

        assert_eq!(registry.app(), Some("app"));
        assert_eq!(registry.services().collect::<Vec<_>>(), ["b", "a"]);
    }

    #[test]
    fn first_app_wins() {
        let mut registry = NamespaceRegistry::new();
        registry.register(&Namespace::app("first"));
        registry.register(&Namespace::app("second"));

        assert_eq!(registry.app(), Some("first"));
        assert!(registry.contains(&Namespace::app("second")));
    }

    #[test]
    fn empty_registry_has_no_app() {
        let registry = NamespaceRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.app(), None);
    }
}
