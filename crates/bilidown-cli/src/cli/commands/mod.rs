//! CLI command handlers. Each command is in its own file.

pub(crate) mod fetch;
pub(crate) mod fetch_info;
pub(crate) mod plan;

pub use fetch::run_fetch;
pub use fetch_info::run_fetch_info;
pub use plan::run_plan;
