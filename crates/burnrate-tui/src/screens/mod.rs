//! Screen components.

pub mod dashboard;

pub use dashboard::Dashboard;
