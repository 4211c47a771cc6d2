//! Domain models for the Fingerling Distribution Tracking System

mod batch;
mod distribution;
mod report;
mod session;
mod user;

pub use batch::*;
pub use distribution::*;
pub use report::*;
pub use session::*;
pub use user::*;
