pub mod server;
pub mod types;

pub(crate) use server::handle_rpc;
pub use types::{RpcError, RpcErrorData, RpcRequest, RpcResponse};
