mod get_user;
mod login;
mod signup;
mod util;
mod verify_email;

use get_user::*;
use login::*;
use signup::*;
pub use util::*;
use verify_email::*;
