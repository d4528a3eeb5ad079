pub mod config;
pub mod ls;
pub mod open;
pub mod pick;
pub mod remove;

pub use config::*;
pub use ls::*;
pub use open::*;
pub use pick::*;
pub use remove::*;
