// Article source implementations
pub mod newsdata;

pub use newsdata::NewsDataProvider;
