use crate::orchestrator::BatchEvaluator;

#[derive(Clone)]
pub struct AppState {
    pub evaluator: BatchEvaluator,

    pub max_urls_per_batch: usize,
}

impl AppState {
    pub fn new(evaluator: BatchEvaluator, max_urls_per_batch: usize) -> Self {
        Self {
            evaluator,
            max_urls_per_batch,
        }
    }
}
