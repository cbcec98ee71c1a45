pub mod db;
pub mod schema;
pub mod watermark;

pub use watermark::{SqliteWatermarkStore, Watermark, WatermarkStore};
