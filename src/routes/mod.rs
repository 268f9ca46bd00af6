pub mod admin;
pub mod genres;
pub mod hello_world;
pub mod movies;
pub mod password_reset;
pub mod user;

pub use admin::*;
pub use genres::*;
pub use hello_world::*;
pub use movies::*;
pub use password_reset::*;
pub use user::*;
