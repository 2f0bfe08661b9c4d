pub mod client;
pub mod executor;
pub mod planner;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod template;
pub mod tooling;
