//! Input validation types for DefendEarth.
//!
//! - [`ValidatedEmail`] - RFC 5321 subset email address validation
//! - [`ValidatedPhone`] - E.164 phone number validation
//!
//! Both types normalize their input, so equality on the validated value is the
//! duplicate check used by the user repository.

pub mod email;
pub mod phone;

pub use email::{validate_email, EmailValidationError, ValidatedEmail};
pub use phone::{validate_phone, PhoneValidationError, ValidatedPhone};
