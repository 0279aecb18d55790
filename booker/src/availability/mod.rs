pub mod evaluator;
pub mod snapshot;
pub mod source;

pub use evaluator::{Availability, evaluate_slot};
pub use snapshot::{AvailabilitySnapshot, BlackoutBlock, Reservation};
