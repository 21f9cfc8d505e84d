// Datasets: sparse document-term matrices, the on-disk dataset layout,
// corpus vectorization, and the sample-dataset downloader.

pub mod corpus;
pub mod dataset;
pub mod download;
pub mod dtm;
