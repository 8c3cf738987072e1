//! Service layer providing business-oriented operations on top of models.
//! - Separates authorization and business logic from data access.
//! - Reuses validation and entity definitions in the `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod auth;
pub mod itinerary_service;
#[cfg(test)]
pub mod test_support;
