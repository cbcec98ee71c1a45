pub mod adapter;
pub mod diff;
pub mod git2_adapter;

pub use adapter::SourceAdapter;
pub use diff::{DiffEntry, FileChangeKind};
pub use git2_adapter::Git2SourceAdapter;
