//! Route configuration
//!
//! Centralized route setup; each domain manages its own routes.
//! Static paths register before parameterized ones so `/search` and
//! friends are never captured by `/{user_id}`.

use crate::handlers;
use actix_web::web;

/// Configure all routes for the application
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(|| async { "OK" }))
        .service(
            web::scope("/api")
                .configure(routes::auth::configure)
                .configure(routes::feed::configure)
                .configure(routes::posts::configure)
                .configure(routes::users::configure)
                .configure(routes::cars::configure),
        );
}

// Sub-modules for each domain
mod routes {
    use super::*;

    pub mod auth {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/auth")
                    .service(handlers::register)
                    .service(handlers::login),
            );
        }
    }

    pub mod feed {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/feed")
                    .service(handlers::get_following_feed)
                    .service(handlers::get_feed),
            );
        }
    }

    pub mod posts {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/posts")
                    .service(handlers::get_top_shout)
                    .service(handlers::create_post)
                    .service(handlers::update_privacy)
                    .service(handlers::like_post)
                    .service(handlers::delete_post),
            );
        }
    }

    pub mod users {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/users")
                    .service(handlers::search_users)
                    .service(handlers::search_cars)
                    .service(handlers::recent_users_with_photos)
                    .service(handlers::admin_list_users)
                    .service(handlers::get_recent_post)
                    .service(handlers::get_user_posts)
                    .service(handlers::get_user_top_shout)
                    .service(handlers::follow_user)
                    .service(handlers::unfollow_user)
                    .service(handlers::get_followers)
                    .service(handlers::get_following)
                    .service(handlers::get_dream_cars)
                    .service(handlers::toggle_dream_car)
                    .service(handlers::get_owned_car)
                    .service(handlers::get_owned_cars)
                    .service(handlers::add_owned_car)
                    .service(handlers::remove_owned_car)
                    .service(handlers::admin_check)
                    .service(handlers::update_username)
                    .service(handlers::get_user),
            );
        }
    }

    pub mod cars {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/cars")
                    .service(handlers::get_car)
                    .service(handlers::update_car)
                    .service(handlers::add_car_owner)
                    .service(handlers::remove_car_owner)
                    .service(handlers::catalog_search),
            );
        }
    }
}
