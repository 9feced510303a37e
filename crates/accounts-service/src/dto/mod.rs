//! Request and response types of the user service.

mod user_dto;

pub use user_dto::*;
