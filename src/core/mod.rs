pub mod config;
pub mod constants;
pub mod controller;
pub mod conversation;
pub mod image;
pub mod message;
pub mod status;
