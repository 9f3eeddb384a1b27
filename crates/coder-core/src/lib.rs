pub mod actions;
pub mod config;
pub mod conversation;
pub mod error;
pub mod feedback;
pub mod ingestion;
pub mod reducer;
pub mod response;
pub mod state;

pub use actions::*;
pub use error::*;
pub use reducer::*;
pub use response::*;
pub use state::*;
