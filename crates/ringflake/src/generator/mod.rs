mod allocator;
mod identity;
mod mutex;
mod status;

pub use allocator::*;
pub use identity::*;
pub use mutex::*;
pub use status::*;
