pub mod json_store;

pub use json_store::{JsonStore, Review, Settings, StoreData, truthy};
