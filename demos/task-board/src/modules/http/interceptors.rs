use std::sync::Arc;

use once_cell::sync::Lazy;
use strata_di::{Binding, Dependency, Token};

use super::http_client::Request;
use crate::tokens::HTTP_CONFIG;

/// Every interceptor bound from the root down to the requesting injector runs, in that order
pub static INTERCEPTORS: Lazy<Token<dyn Interceptor>> =
    Lazy::new(|| Token::multi("http_interceptors"));

/// Hook run on every outgoing request
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn intercept(&self, request: &mut Request);
}

pub struct AuthInterceptor {
    api_key: Option<String>,
}

impl Interceptor for AuthInterceptor {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn intercept(&self, request: &mut Request) {
        match &self.api_key {
            Some(key) => request.header("authorization", format!("Bearer {key}")),
            None => tracing::warn!(
                "No api key configured, sending {} unauthenticated",
                request.path
            ),
        }
    }
}

pub struct TracingInterceptor;

impl Interceptor for TracingInterceptor {
    fn name(&self) -> &'static str {
        "tracing"
    }

    fn intercept(&self, request: &mut Request) {
        tracing::debug!("{} {}", request.method, request.path);
        request.header("x-request-source", "task-board".to_string());
    }
}

/// Marks requests made from the admin scope
pub struct AuditInterceptor {
    pub actor: &'static str,
}

impl Interceptor for AuditInterceptor {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn intercept(&self, request: &mut Request) {
        request.header("x-audit-actor", self.actor.to_string());
    }
}

/// Interceptors every injector gets from the root
pub fn default_interceptors() -> [Binding; 2] {
    [
        Binding::factory(&INTERCEPTORS, [Dependency::on(&HTTP_CONFIG)], |deps| {
            let config = deps.get(&HTTP_CONFIG)?;
            Ok(Arc::new(AuthInterceptor {
                api_key: config.api_key.clone(),
            }) as Arc<dyn Interceptor>)
        }),
        Binding::value(&INTERCEPTORS, Arc::new(TracingInterceptor) as Arc<dyn Interceptor>),
    ]
}
