// Coordinators layer - Workflow orchestration
//
// Coordinators handle workflow orchestration by composing provider operations
// for specific API endpoints. Policy checks happen here, before any write.

pub mod directory_coordinator;
pub mod login_coordinator;
pub mod payment_coordinator;
pub mod registration_coordinator;

pub use directory_coordinator::DirectoryCoordinator;
pub use login_coordinator::{IssuedToken, LoginCoordinator};
pub use payment_coordinator::PaymentCoordinator;
pub use registration_coordinator::RegistrationCoordinator;
