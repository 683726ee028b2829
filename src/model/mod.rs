pub mod common;
pub mod raw;
pub mod star;
