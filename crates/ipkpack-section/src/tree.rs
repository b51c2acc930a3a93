use std::collections::HashSet;

/// Every directory path leading to and including `dir`, outermost first.
///
/// `"usr/palm/applications"` yields `usr`, `usr/palm`, `usr/palm/applications`.
/// Empty segments are ignored, so leading, trailing and doubled slashes
/// collapse; `""` and `"."` yield nothing.
pub fn ancestors(dir: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for segment in dir.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(segment);
        out.push(current.clone());
    }
    out
}

/// Set of directories already emitted into a section.
#[derive(Debug, Clone, Default)]
pub struct DirectoryTree {
    created: HashSet<String>,
}

impl DirectoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `dir` and all of its ancestors.
    ///
    /// Returns only the directories that were not recorded before, outermost
    /// first. Inserting the same path again returns an empty list.
    pub fn insert(&mut self, dir: &str) -> Vec<String> {
        ancestors(dir)
            .into_iter()
            .filter(|path| self.created.insert(path.clone()))
            .collect()
    }

    pub fn contains(&self, dir: &str) -> bool {
        self.created.contains(dir.trim_matches('/'))
    }

    pub fn len(&self) -> usize {
        self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }
}
