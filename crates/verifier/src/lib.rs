pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use client::{EudiploClient, VerificationClient};
pub use error::{VerifyError, VerifyResult};
pub use types::*;
