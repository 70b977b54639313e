pub mod breakdown;
pub mod section;
pub mod template;

pub use breakdown::extract_task_breakdown;
pub use section::{locate_section, LocatedSection, SectionNode, SectionTree};
pub use template::{resolve_template, TemplateOutput};
