pub mod connection;
pub mod entities;
pub mod migrations;
pub mod store;
pub mod test_utils;
