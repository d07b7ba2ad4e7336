//! Clinic finder: a small chatbot that suggests the nearest clinics.

pub mod catalog;
pub mod channels;
pub mod config;
pub mod dialog;
pub mod error;
pub mod geo;
pub mod host;
pub mod intent;
pub mod ranker;
pub mod store;
