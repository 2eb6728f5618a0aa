mod catalog;
mod item;
pub mod timestamp;

pub use catalog::{Catalog, Seasons};
pub use item::MediaItem;
