// Core algorithm exports
pub mod allocator;
pub mod category;
pub mod expiration;
pub mod status;

pub use allocator::{AllocationError, SeatAllocator};
pub use category::{pick_unbounded_fallback, resolve_category, NoUnboundedCategory};
pub use expiration::{reservation_deadline, WorkingDays, WorkingDaysError};
pub use status::StatusTracker;
