pub mod evaluation;
pub mod schema;

pub use evaluation::{
    Axis, Evaluation, EvaluationRequest, EvaluationResult, ExtractedText, FetchedPage,
    OVERALL_FIELD, REASON_FIELD,
};
pub use schema::{FieldKind, FieldSpec, OutputSchema};
