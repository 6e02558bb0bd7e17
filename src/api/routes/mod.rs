// src/api/routes/mod.rs
//! API routes module

pub mod audio;
pub mod health;
pub mod resources;

use axum::Router;

use crate::api::AppState;
use crate::resources::{AudioBayanat, Books, HamdoNaat, IslahiMajalis, Poems, Quotes};

/// Create all API routes
pub fn create_routes() -> Router<AppState> {
    let router = Router::new();
    let router = resources::mount::<AudioBayanat>(router);
    let router = resources::mount::<HamdoNaat>(router);
    let router = resources::mount::<Poems>(router);
    let router = resources::mount::<Quotes>(router);
    let router = resources::mount::<Books>(router);
    let router = resources::mount::<IslahiMajalis>(router);

    router
        .nest("/api/audio", audio::create_routes())
        .nest("/health", health::create_routes())
}
