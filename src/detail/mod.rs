mod detail;
mod functions;
mod generator;

pub use detail::*;
pub use functions::*;
pub use generator::*;
