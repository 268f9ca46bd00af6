mod create_movie;
mod delete_movie;
mod get_movie;
mod list_movies;
mod manage_genres;
mod movie_input;
mod update_movie;
mod util;

use create_movie::*;
use delete_movie::*;
use get_movie::*;
use list_movies::*;
use manage_genres::*;
pub use movie_input::*;
use update_movie::*;
pub use util::*;
