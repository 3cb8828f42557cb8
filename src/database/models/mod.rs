pub mod profile;
pub mod user;

pub use profile::{NewProfile, Profile, ProfileChanges};
pub use user::{User, UserSummary};
