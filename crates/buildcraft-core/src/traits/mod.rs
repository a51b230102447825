pub mod item_api;

pub use item_api::ItemApi;
