//! The browser wizard: login gate, per-browser sessions and form routes.

pub mod routes;
pub mod session;
pub mod views;
