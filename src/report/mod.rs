pub mod access;
pub mod parser;
pub mod query;
pub mod service;
pub mod status;
pub mod upload;
