pub mod availability;
pub mod catalog;
pub mod feedback;
pub mod merge;
pub mod mood;
pub mod providers;
pub mod search;

pub use availability::{AvailabilityProvider, WatchmodeProvider};
pub use catalog::CatalogService;
pub use feedback::FeedbackStore;
pub use mood::{GeminiInterpreter, KeywordInterpreter, MoodInterpreter};
pub use search::{ContentSearch, SearchPolicy};
