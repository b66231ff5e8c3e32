use std::sync::Arc;

use once_cell::sync::Lazy;
use strata_di::{Construct, Dependencies, Dependency, DynError, Token};

use super::interceptors::{Interceptor, INTERCEPTORS};
use crate::tokens::HTTP_CONFIG;

pub static HTTP_CLIENT: Lazy<Token<HttpClient>> = Lazy::new(|| Token::single("http_client"));

#[derive(Debug, Clone)]
pub struct Request {
    pub method: &'static str,
    pub path: String,
    pub headers: Vec<(&'static str, String)>,
}

impl Request {
    pub fn new(method: &'static str, path: impl Into<String>) -> Self {
        Request {
            method,
            path: path.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(&mut self, name: &'static str, value: String) {
        self.headers.push((name, value));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub url: String,
    pub headers: Vec<&'static str>,
}

/// Simulated client for the sync backend, nothing leaves the process
pub struct HttpClient {
    base_url: String,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl HttpClient {
    pub fn send(&self, mut request: Request) -> Response {
        for interceptor in &self.interceptors {
            interceptor.intercept(&mut request);
        }

        let url = format!("{}{}", self.base_url, request.path);
        tracing::info!("{} {} ({} headers)", request.method, url, request.headers.len());

        Response {
            status: 200,
            url,
            headers: request.headers.iter().map(|(name, _)| *name).collect(),
        }
    }

    pub fn interceptor_names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|interceptor| interceptor.name()).collect()
    }
}

impl Construct for HttpClient {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::on(&HTTP_CONFIG), Dependency::optional(&INTERCEPTORS)]
    }

    fn construct(deps: &Dependencies) -> Result<Self, DynError> {
        Ok(HttpClient {
            base_url: deps.get(&HTTP_CONFIG)?.base_url.clone(),
            interceptors: deps.all(&INTERCEPTORS)?,
        })
    }
}
