pub mod response;
pub mod username;

pub use response::ApiResponse;
pub use username::{normalize_optional_text, normalize_username};
