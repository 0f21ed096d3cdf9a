pub mod constants;
pub mod errors;
pub mod fixtures;
pub mod logger;
