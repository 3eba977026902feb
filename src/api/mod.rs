pub mod client;
mod traits;
mod types;

pub use client::MoodboardClient;
pub use traits::MoodService;
pub use types::*;
