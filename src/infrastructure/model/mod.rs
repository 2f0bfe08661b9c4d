//! Model infrastructure module
//!
//! Chat backends the plan executor sends conversations to.
//!
//! # Structure
//! - `types` - error type
//! - `traits` - [`ChatBackend`]
//! - `adapter` - message format adapters
//! - `factory` - provider factory for creating clients
//! - `clients` - individual client implementations

pub mod adapter;
pub mod clients;
pub mod factory;
pub mod traits;
pub mod types;

pub use factory::ProviderFactory;
pub use traits::ChatBackend;
pub use types::ModelError;
