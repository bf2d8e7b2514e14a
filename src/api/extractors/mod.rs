//! Custom axum extractors.

mod json;
mod path;
mod validated_json;

pub use json::AppJson;
pub use path::AppPath;
pub use validated_json::ValidatedJson;
