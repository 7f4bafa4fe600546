pub mod extractors;

pub use extractors::{ApiJson, ApiQuery};
