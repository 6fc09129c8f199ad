pub mod cache;

pub use cache::{CacheKey, SearchCache, TitleCache};
