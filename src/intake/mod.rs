pub mod validator;

pub use validator::{IntakeValidator, RejectionReason, ValidationOutcome};
