pub mod dto;
pub mod services;

pub use dto::{ActivityLevel, Gender, ProfileUpdate, UserProfile};
