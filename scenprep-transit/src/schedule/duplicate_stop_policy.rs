use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// how a merge treats a stop facility whose id is already present in the
/// merged document.
#[derive(Debug, Default, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateStopPolicy {
    /// keep both stops, giving the later one the id `<id>+<n>` and
    /// redirecting its document's route references to the new id.
    #[default]
    Rename,
    /// keep the first stop and drop later ones with the same id.
    Skip,
}

impl std::fmt::Display for DuplicateStopPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DuplicateStopPolicy::Rename => "rename",
            DuplicateStopPolicy::Skip => "skip",
        };
        write!(f, "{s}")
    }
}
