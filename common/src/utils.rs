pub mod format;
pub mod interface;
