//! HTTP transport for the reminder backend.
//!
//! Requires the `http` feature. The server side is an axum router over a
//! [`ReminderStore`](crate::ReminderStore); the client side is a reqwest
//! client that plugs into the query cache and the toggle controller.
//!
//! ## Routes
//!
//! - `GET /health`: `{ "ok": true }`.
//! - `GET /reminders`: every reminder.
//! - `GET /collections/:collection_id/reminders`: reminders in one collection.
//! - `POST /reminders/status`: body `UpdateStatusRequest`, returns the stored `Reminder`.
//! - `GET /organizations/:org_id`: `OrganizationInfo`, or 404.
//!
//! The client maps cache keys onto the list routes with
//! [`CacheKey::collection_id`](crate::CacheKey::collection_id): a key such as
//! `"reminders:home"` reads `/collections/home/reminders`, a key without `:`
//! reads `/reminders`, whatever the configured list name.

mod client;
mod server;

pub use client::HttpReminderClient;
pub use server::{router, serve};
