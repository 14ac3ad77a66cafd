// Data model: the résumé as delivered by the parser, the scoring context, and the report.
// Inputs are read-only for a run; reports are created fresh and never retained.

pub mod context;
pub mod report;
pub mod resume;

pub use context::{Level, ScoringContext};
pub use report::{
    Aggregation, Category, CategoryBreakdown, Diagnostics, ParameterResult, ScoreReport,
};
pub use resume::{
    CertificationEntry, Contact, DocumentMetadata, EducationEntry, ExperienceEntry,
    ResumeDocument,
};
