// Topic model trait: anything that turns a document-term matrix into a fitted model.
//
// The evaluator only needs "fit this matrix and hand back the distributions",
// so anything implementing this trait can be swept. The default
// implementation is the collapsed Gibbs sampler in `lda.rs`.

use super::model::FittedModel;
use crate::data::dtm::DocumentTermMatrix;
use anyhow::Result;

/// Trait for fitting a topic model to a document-term matrix.
pub trait TopicModel {
    /// Fit the model and return its topic-word and document-topic distributions.
    fn fit(&self, dtm: &DocumentTermMatrix) -> Result<FittedModel>;
}
