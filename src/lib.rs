//! Calendar Dispatch - Korean text commands against Google Calendar
//!
//! Text is resolved to the first registered command that matches, a
//! service-account bearer token is minted, and the command's handler talks
//! to the calendar API.

pub mod auth;
pub mod calendar;
pub mod command;
pub mod core;
pub mod server;
