mod executor;
mod policy;
mod signal;
mod worker;

pub use executor::*;
pub use policy::*;
pub use signal::*;
pub use worker::*;
