mod adapter;
mod error;
mod http;
mod interface;

pub use adapter::{DelegatedPayload, PromptOverrides, ResourceOverrides};
pub use error::TaskRunnerError;
pub use http::HttpTaskRunner;
pub use interface::TaskRunner;
