mod get_genres;
mod util;

use get_genres::*;
pub use util::*;
