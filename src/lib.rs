#![forbid(unsafe_code)]

pub mod app;
pub mod auth;
pub mod build;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod formats;
pub mod generator;
pub mod hydrate;
pub mod layout;
pub mod logging;
pub mod openai;
pub mod prompts;
pub mod render;
pub mod workflow;
