mod appointment;
mod offering;
mod setting;

pub use appointment::*;
pub use offering::*;
pub use setting::*;
