mod address;
mod asset;
mod cache;
mod error;
mod handle;
mod io;
mod library;
mod load;
mod settings;

pub use address::*;
pub use asset::*;
pub use cache::*;
pub use error::*;
pub use handle::*;
pub use io::*;
pub use library::*;
pub use load::*;
pub use settings::*;

pub use kura_task::*;
