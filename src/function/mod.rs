//! Remote function invocation.

mod invoker;
mod lambda;

pub use invoker::{InvocationRequest, InvocationResult, Invoker};
pub use lambda::{LambdaHttpInvoker, DEFAULT_ENDPOINT};
