pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod types;

pub use error::ListsError;
pub use router::{ListsState, lists_router};
