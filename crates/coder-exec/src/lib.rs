pub mod backend;
pub mod client;
pub mod contracts;
pub mod error;
pub mod executor;
pub mod session;

pub use backend::*;
pub use client::*;
pub use contracts::*;
pub use error::*;
pub use executor::*;
pub use session::*;
