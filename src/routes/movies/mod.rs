mod get_movie_count;
mod get_movie_info;
mod get_movie_list;
mod util;

use get_movie_count::*;
use get_movie_info::*;
use get_movie_list::*;
pub use util::*;
