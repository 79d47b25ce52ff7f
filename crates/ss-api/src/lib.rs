//! # ss-api
//!
//! The StyleSync facade and its JSON HTTP surface.

pub mod error;
pub mod facade;
pub mod fallback;
pub mod handlers;
pub mod local_cache;
pub mod middleware;
pub mod mock;
pub mod random;
pub mod record;

pub use facade::{FacadeOptions, Ports, StyleSync};

use actix_web::web;

/// Mounts the API routes.
///
/// # Developer Note
/// Routes live under a scope so the binary can mount them under another
/// prefix (e.g., /api/v2/) if needed.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/sign-in", web::post().to(handlers::sign_in))
                    .route("/sign-up", web::post().to(handlers::sign_up))
                    .route("/sign-out", web::post().to(handlers::sign_out))
                    .route("/session", web::get().to(handlers::session))
                    .route("/oauth/{provider}", web::get().to(handlers::sign_in_with_provider)),
            )
            .service(
                web::scope("/profile")
                    .route("", web::get().to(handlers::get_profile))
                    .route("", web::patch().to(handlers::update_profile))
                    .route("/avatar", web::post().to(handlers::upload_avatar))
                    .route("/stats", web::get().to(handlers::profile_stats)),
            )
            .route("/categories", web::get().to(handlers::list_categories))
            .service(
                web::scope("/items")
                    .route("", web::get().to(handlers::list_items))
                    .route("", web::post().to(handlers::create_item))
                    .route("/image", web::post().to(handlers::upload_item_image))
                    .route("/{id}", web::patch().to(handlers::update_item))
                    .route("/{id}", web::delete().to(handlers::delete_item))
                    .route("/{id}/favorite", web::put().to(handlers::set_favorite)),
            )
            .service(
                web::scope("/outfits")
                    .route("", web::get().to(handlers::list_outfits))
                    .route("", web::post().to(handlers::create_outfit))
                    .route("/starred", web::get().to(handlers::starred_outfits))
                    .route("/random", web::post().to(handlers::random_outfit))
                    .route("/{id}", web::patch().to(handlers::update_outfit))
                    .route("/{id}", web::delete().to(handlers::delete_outfit))
                    .route("/{id}/star", web::put().to(handlers::set_starred)),
            )
            .service(
                web::scope("/events")
                    .route("", web::get().to(handlers::list_events))
                    .route("", web::post().to(handlers::create_event))
                    .route("/upcoming", web::get().to(handlers::upcoming_events))
                    .route("/{id}", web::patch().to(handlers::update_event))
                    .route("/{id}", web::delete().to(handlers::delete_event)),
            )
            .service(
                web::scope("/boards")
                    .route("", web::get().to(handlers::list_boards))
                    .route("", web::post().to(handlers::create_board))
                    .route("/public", web::get().to(handlers::public_boards))
                    .route("/items/{placement_id}", web::patch().to(handlers::move_board_item))
                    .route("/items/{placement_id}", web::delete().to(handlers::remove_board_item))
                    .route("/{id}", web::get().to(handlers::get_board))
                    .route("/{id}", web::patch().to(handlers::update_board))
                    .route("/{id}", web::delete().to(handlers::delete_board))
                    .route("/{id}/items", web::post().to(handlers::add_board_item)),
            )
            .service(
                web::scope("/diagnostics")
                    .route("/connection", web::get().to(handlers::test_connection))
                    .route("/storage", web::get().to(handlers::test_storage))
                    .route("/database", web::get().to(handlers::debug_database))
                    .route("/local/clear", web::post().to(handlers::clear_local_records)),
            ),
    );
}
