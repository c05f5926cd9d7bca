pub mod catalog;
pub mod cluster;
pub mod config;
pub mod error;
pub mod grades;
pub mod matching;
pub mod output;
pub mod quiz;
pub mod recommend;
pub mod server;
pub mod store;
