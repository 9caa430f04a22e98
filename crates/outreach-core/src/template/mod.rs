//! Reusable campaign configuration templates.

pub mod model;

pub use model::{builtin_templates, Template, TemplateDraft, TemplatePatch};
