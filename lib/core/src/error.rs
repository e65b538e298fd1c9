//! Error handling foundation for agentflow.
//!
//! This module provides only the `Result` type alias using rootcause.
//! Each crate defines its own domain error enums in its own `error`
//! module and lifts them into a [`Report`] with `?` at the boundary where
//! the failure is first observed.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
///
/// The context parameter names the domain error carried by the report,
/// e.g. `Result<Workflow, PersistenceError>`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_type_works() {
        let ok: Result<i32> = Ok(42);
        assert_eq!(ok.expect("should be ok"), 42);
    }
}
