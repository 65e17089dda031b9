pub mod auth;
pub mod cars;
pub mod feed;
pub mod posts;
pub mod users;

pub use auth::*;
pub use cars::*;
pub use feed::*;
pub use posts::*;
pub use users::*;
