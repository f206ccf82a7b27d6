//! Query modules: free functions over a borrowed connection, one module per
//! table family.

pub mod audit_ops;
pub mod detection_ops;
pub mod maintenance;
pub mod metric_ops;
pub mod notification_ops;
pub mod override_ops;
pub mod project_ops;
pub mod rate_limit_ops;
pub mod suspension_ops;
