pub mod health;
pub mod notes;
pub mod users;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/register", web::post().to(users::register))
            .route("/login", web::post().to(users::login))
            .route("/notes", web::get().to(notes::list_notes))
            .route("/upload", web::post().to(notes::upload))
            .route("/download/{note_id}", web::get().to(notes::download))
            .route("/health", web::get().to(health::health_check)),
    );
}
