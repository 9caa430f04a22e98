//! Application services wiring the Outreach core to a transport.

pub mod analysis_service;
pub mod task_store;
pub mod template_registry;

pub use analysis_service::AnalysisService;
pub use task_store::{BatchOperation, BatchOutcome, TaskStore};
pub use template_registry::TemplateRegistry;
