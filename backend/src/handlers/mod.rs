//! HTTP handlers for the Fingerling Distribution Tracking System

pub mod auth;
pub mod batch;
pub mod distribution;
pub mod health;
pub mod prediction;
pub mod reporting;
pub mod session;
pub mod upload;
pub mod user;

pub use auth::*;
pub use batch::*;
pub use distribution::*;
pub use health::*;
pub use prediction::*;
pub use reporting::*;
pub use session::*;
pub use upload::*;
pub use user::*;
