mod result;
mod worker;

pub use result::*;
pub use worker::*;
