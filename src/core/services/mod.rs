pub mod authentication;
pub mod enrollment;

pub use authentication::AuthenticationService;
pub use enrollment::EnrollmentService;
