pub mod error;
pub mod extract;
pub mod limiters;

pub use error::ApiError;
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use limiters::Limiters;
