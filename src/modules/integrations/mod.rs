pub mod algolia;

pub use algolia::AlgoliaClient;
