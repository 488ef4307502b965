pub mod aggregator;
pub mod directions;
pub mod distance;
pub mod enhancer;
pub mod gemini;
pub mod openai;
pub mod providers;

pub use aggregator::Aggregator;
pub use enhancer::PlaceEnhancer;
