pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryProfileRepository;
pub use repository::{PgProfileRepository, ProfileRepository};
