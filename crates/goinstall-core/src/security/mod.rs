//! Security validation modules.

pub mod path;
pub mod quota;

pub use path::DEFAULT_SENSITIVE_DIRS;
pub use path::clean_path;
pub use path::default_sensitive_dirs;
pub use path::resolve_and_validate_path;
pub use path::resolve_existing_prefix;
pub use path::validate_containment;
pub use path::validate_encoding;
pub use path::validate_header_name;
pub use path::validate_linkname;
pub use quota::QuotaTracker;
