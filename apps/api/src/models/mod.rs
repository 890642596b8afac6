pub mod bid;
pub mod profile;
