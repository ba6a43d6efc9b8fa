use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Interceptor error: {0}")]
    Interceptor(#[from] InterceptorError),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

#[derive(Error, Debug)]
pub enum InterceptorError {
    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Pre-handle failed: {0}")]
    PreHandle(String),

    #[error("Post-handle failed: {0}")]
    PostHandle(String),

    #[error("Completion callback failed: {0}")]
    AfterCompletion(String),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
