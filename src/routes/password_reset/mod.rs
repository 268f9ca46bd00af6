mod reset_password;
mod send_reset_email;
mod util;
mod validate_reset_token;

use reset_password::*;
use send_reset_email::*;
pub use util::*;
use validate_reset_token::*;
