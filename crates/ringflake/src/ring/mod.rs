mod buffer;
mod policy;
mod slot;
#[cfg(test)]
mod tests;

pub use buffer::*;
pub use policy::*;
pub use slot::SlotState;
pub(crate) use slot::Slot;
