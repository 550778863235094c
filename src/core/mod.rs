//! Core module - Framework-agnostic list controllers and record business logic.
//!
//! The list layer (`filters`, `pagination`, `list_state`, `client_list`, `server_list`,
//! `fetcher`, `deletion`, `source`) knows nothing about storage. The record modules (`user`,
//! `transaction`, `opportunity`, `post`, `webinar`, `document`, `project`) hold validation and
//! SeaORM queries for one entity each.

pub mod client_list;
pub mod deletion;
pub mod fetcher;
pub mod filters;
pub mod list_state;
pub mod pagination;
pub mod server_list;
pub mod session;
pub mod source;

pub mod document;
pub mod opportunity;
pub mod post;
pub mod project;
pub mod query;
pub mod transaction;
pub mod user;
pub mod webinar;
