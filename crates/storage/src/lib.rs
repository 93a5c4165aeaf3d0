pub mod records;
pub mod repository;
pub mod sqlite;
