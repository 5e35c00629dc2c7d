mod classification;
mod client_hints;
mod device_type;
mod signals;

pub use classification::*;
pub use client_hints::*;
pub use device_type::*;
pub use signals::*;
