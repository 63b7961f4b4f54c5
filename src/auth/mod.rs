pub mod dto;
pub mod services;

pub use dto::{AuthResponse, LoginRequest, RegisterRequest};
