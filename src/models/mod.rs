//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the request and response bodies built from them.

/// Admin API key model
pub mod api_key;
/// Categories and cities
pub mod catalog;
/// Conversations and messages
pub mod chat;
/// Listing comments
pub mod comment;
/// Listings and their pricing
pub mod listing;
/// Ephemeral stories
pub mod story;
