mod parse;
mod services;
mod vision;

pub use parse::MealEstimate;
pub use services::AnalysisPipeline;
pub use vision::{OpenAiVision, VisionClient};
