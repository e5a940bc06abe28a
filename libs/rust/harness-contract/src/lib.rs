//! Response contract validation.
//!
//! A [`Contract`] is an explicit descriptor (field name, expected kind,
//! required or optional) interpreted by one generic [`validate`] function.
//! Validation never stops at the first mismatch: every violation in the body
//! is collected so a single failing test shows the whole discrepancy.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod contract;
pub mod validator;

pub use catalog::NamedContract;
pub use contract::{Contract, FieldKind, FieldSpec};
pub use validator::{ContractFailure, ContractViolation, assert_contract, validate};
