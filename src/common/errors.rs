use lambda_http::{Error as LambdaError, Response};

/// Handler failure: either a response to hand back to the client as-is, or
/// an error that fails the invocation.
#[derive(Debug)]
pub enum Error {
    HttpError(Response<String>),
    LambdaError(LambdaError),
}

impl<E> From<E> for Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Error::LambdaError(Box::new(err))
    }
}
