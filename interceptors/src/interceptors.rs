use async_trait::async_trait;
use dispatch_core::{
    DispatchError, HandlerInterceptor, HandlerResult, Request, RequestHandler, Response, Result,
};
use tracing::{debug, error, info, instrument};

/// Logs the life of a request: receipt in pre_handle, the handler result in
/// post_handle, and the terminal state in after_completion. Always proceeds.
pub struct LoggingInterceptor;

#[async_trait]
impl HandlerInterceptor for LoggingInterceptor {
    #[instrument(skip(self, request, _response, handler))]
    async fn pre_handle(
        &self,
        request: &Request,
        _response: &mut Response,
        handler: &dyn RequestHandler,
    ) -> Result<bool> {
        info!(
            request_id = %request.id,
            method = %request.method,
            path = %request.path,
            handler = %handler.name(),
            "Received request"
        );
        Ok(true)
    }

    #[instrument(skip(self, request, response, _handler, result))]
    async fn post_handle(
        &self,
        request: &Request,
        response: &mut Response,
        _handler: &dyn RequestHandler,
        result: Option<&HandlerResult>,
    ) -> Result<()> {
        debug!(
            request_id = %request.id,
            status = response.status,
            result = ?result,
            "Handled request"
        );
        Ok(())
    }

    #[instrument(skip(self, request, response, _handler, error))]
    async fn after_completion(
        &self,
        request: &Request,
        response: &mut Response,
        _handler: &dyn RequestHandler,
        error: Option<&DispatchError>,
    ) -> Result<()> {
        match error {
            Some(err) => error!(
                request_id = %request.id,
                status = response.status,
                error = %err,
                "Request completed with error"
            ),
            None => info!(
                request_id = %request.id,
                status = response.status,
                "Request completed"
            ),
        }
        Ok(())
    }
}

/// Declines requests whose `authorization` header is not on the allowlist. On a
/// rejection it writes the 403 response itself and stops the chain, so the handler
/// never runs.
pub struct AuthInterceptor {
    allowed_tokens: Vec<String>,
}

impl AuthInterceptor {
    pub fn new(allowed_tokens: Vec<String>) -> Self {
        Self { allowed_tokens }
    }
}

#[async_trait]
impl HandlerInterceptor for AuthInterceptor {
    #[instrument(skip(self, request, response, _handler))]
    async fn pre_handle(
        &self,
        request: &Request,
        response: &mut Response,
        _handler: &dyn RequestHandler,
    ) -> Result<bool> {
        match request.header("authorization") {
            Some(token) if self.allowed_tokens.iter().any(|t| t == token) => {
                info!(request_id = %request.id, "Request authorized");
                Ok(true)
            }
            _ => {
                error!(request_id = %request.id, "Unauthorized request");
                response.status = 403;
                response.body = Some("Forbidden".to_string());
                Ok(false)
            }
        }
    }
}
