pub mod ask;
pub mod product;

pub use ask::{AskRequest, AskResponse, IntentInfo};
pub use product::{Product, Specifications};
