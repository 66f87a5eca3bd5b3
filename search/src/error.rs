use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScopeError>;

#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("proxy error: {0}")]
    Proxy(#[from] ProxyError),

    #[error("no proxy configured for scope {0}")]
    NoProxy(String),
}

/// The backend refused or failed to issue a call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    #[error("scope {0} is not reachable")]
    Unreachable(String),

    #[error("backend call failed: {0}")]
    Call(String),
}
