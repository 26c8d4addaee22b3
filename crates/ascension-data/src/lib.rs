pub mod economy;
pub mod loader;
pub mod schema;

pub use economy::{EconomyData, load_economy};
pub use loader::DataLoadError;
