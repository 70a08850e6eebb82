pub mod render;
pub mod session;

pub use session::{is_supported_image, AnalysisSession};
