pub mod config;
pub mod error;
pub mod migrations;
pub mod rules;
pub mod models {
    pub mod document;
}
pub mod db {
    pub mod connection;
    pub mod repository;
}
