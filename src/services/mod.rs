//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle database transactions, validation, and realtime publication.

pub mod api_key_service;
pub mod catalog_service;
pub mod chat_hub;
pub mod chat_service;
pub mod comment_service;
pub mod listing_filter;
pub mod listing_service;
pub mod story_service;
pub mod validation;
