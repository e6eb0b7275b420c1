pub mod client;
pub mod error;
pub mod urls;

pub use client::*;
pub use error::YtDlpError;
pub use urls::*;
