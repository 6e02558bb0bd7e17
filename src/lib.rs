//! Content service for the Dar ul Eman site: six create-only collections
//! behind a small JSON API, plus a streaming proxy for remote audio.

pub mod api;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod models;
pub mod repository;
pub mod resources;
pub mod web;
