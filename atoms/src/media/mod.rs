// Re-export model types, stores and service functions
pub mod dynamo_store;
pub mod error;
pub mod http;
pub mod memory_store;
pub mod model;
pub mod service;
pub mod store;


pub use dynamo_store::DynamoImageStore;
pub use error::ImageError;
pub use http::*;
pub use memory_store::MemoryImageStore;
pub use model::{CreateImagePayload, Image, ImageFieldsPayload, TagPayload, UpdateImagePayload};
pub use service::*;
pub use store::ImageStore;
