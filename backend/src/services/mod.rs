//! Business logic services for the Fingerling Distribution Tracking System

pub mod auth;
pub mod batch;
pub mod distribution;
pub mod reporting;
pub mod session;
pub mod upload;
pub mod user;

pub use auth::AuthService;
pub use batch::BatchService;
pub use distribution::DistributionService;
pub use reporting::ReportingService;
pub use session::SessionService;
pub use upload::UploadService;
pub use user::UserService;
