// Handlers are grouped by access:
//   public  - service info and health, no token needed
//   profile - JWT required, the caller is taken from the token
pub mod health;
pub mod profile;

pub use health::{health, root};
pub use profile::{create_profile, delete_profile, find_profiles, get_profile, update_profile};
