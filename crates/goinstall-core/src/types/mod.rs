//! Data types shared by the validator and the extractor.
//!
//! - [`ArchiveEntry`]: one decoded, unvalidated tar header.
//! - [`EntryType`]: the entry categories the extractor dispatches on.
//! - [`DestDir`]: the destination of one extraction, computed once.

pub mod dest_dir;
pub mod entry;
pub mod entry_type;

pub use dest_dir::DestDir;
pub use entry::ArchiveEntry;
pub use entry::HeaderField;
pub use entry_type::EntryType;
