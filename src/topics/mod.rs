// Topic modeling: the LDA Gibbs sampler and fitted-model distributions.

pub mod lda;
pub mod model;
pub mod special;
pub mod traits;
