pub mod cars;
pub mod catalog;
pub mod feed;
pub mod posts;
pub mod users;
pub mod visibility;

pub use cars::CarService;
pub use catalog::CatalogClient;
pub use feed::{FeedService, PgSocialGraph, SocialGraph};
pub use posts::PostService;
pub use users::UserService;
