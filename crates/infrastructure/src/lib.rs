pub mod cache;
pub mod dns;
pub mod repositories;
