pub mod file_store;
pub mod memory_store;
pub mod model;
pub mod repository;

pub use file_store::JsonScheduleStore;
pub use memory_store::InMemoryScheduleStore;
pub use model::{BookingState, DesiredBooking, FailureRecord, ScheduleFile};
pub use repository::ScheduleRepository;
