pub mod api;
pub mod auth;
pub mod config;
pub mod decode;
pub mod error;
pub mod foods;
pub mod images;
pub mod meals;
pub mod screens;
pub mod state;
pub mod storage;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;
