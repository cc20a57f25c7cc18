mod interface;
mod layout;
mod parts;
mod ringflake;

pub use interface::*;
pub use layout::*;
pub use parts::*;
pub use ringflake::*;
