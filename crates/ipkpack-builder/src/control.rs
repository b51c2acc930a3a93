use crate::metadata::PackageMetadata;

pub const DEFAULT_SECTION: &str = "misc";
pub const DEFAULT_PRIORITY: &str = "optional";
pub const DEFAULT_ARCHITECTURE: &str = "all";
pub const PACKAGE_FORMAT_VERSION: u32 = 2;

/// The `control` file of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSection {
    pub package: String,
    pub version: String,
    pub section: String,
    pub priority: String,
    pub architecture: String,
    pub format_version: u32,
}

impl ControlSection {
    pub fn new(meta: &PackageMetadata) -> Self {
        Self {
            package: meta.id.clone(),
            version: meta.version.clone(),
            section: DEFAULT_SECTION.to_string(),
            priority: DEFAULT_PRIORITY.to_string(),
            architecture: DEFAULT_ARCHITECTURE.to_string(),
            format_version: PACKAGE_FORMAT_VERSION,
        }
    }

    /// Key/value pairs in file order.
    pub fn fields(&self) -> [(&'static str, String); 6] {
        [
            ("Package", self.package.clone()),
            ("Version", self.version.clone()),
            ("Section", self.section.clone()),
            ("Priority", self.priority.clone()),
            ("Architecture", self.architecture.clone()),
            (
                "webOS-Package-Format-Version",
                self.format_version.to_string(),
            ),
        ]
    }

    /// One `Key: Value\n` line per field.
    pub fn render(&self) -> String {
        self.fields()
            .iter()
            .map(|(key, value)| format!("{key}: {value}\n"))
            .collect()
    }
}
