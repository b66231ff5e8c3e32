use std::{fmt, ops::Deref, sync::Arc};

use strata_di::{Binding, Dependency, Injectable, Token};

use crate::provider::ConfigProvider;

/// A wrapper type to allow for config injections
///
/// This provides a simple way to retrieve configs from the config registry,
/// and inject them on a binding as a dependency
///
/// # Example
/// ```rust
/// use strata_config::{config::Config, provider::ConfigProvider};
/// use strata_di::{Dependency, Injector, Token};
///
/// struct ListConfig {
///     page_size: usize,
/// }
///
/// let providers: Token<ConfigProvider> = Token::single("config_provider");
/// let list_config: Token<Config<ListConfig>> = Token::single("list_config");
/// let page_size: Token<usize> = Token::single("page_size");
///
/// let mut config_provider = ConfigProvider::new();
/// config_provider.add_config(ListConfig { page_size: 25 }).unwrap();
///
/// let root = Injector::builder()
///     .add_value(&providers, config_provider)
///     .add(Config::<ListConfig>::binding(&list_config, &providers))
///     .add_factory(&page_size, [Dependency::on(&list_config)], move |deps| {
///         Ok(deps.get(&list_config)?.page_size)
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(*root.get(&page_size).unwrap(), 25);
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T> Clone for Config<T> {
    fn clone(&self) -> Self {
        Config {
            inner: self.inner.clone(),
        }
    }
}
impl<T: fmt::Debug> fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Config").field(&self.inner).finish()
    }
}
impl<T> Config<T> {
    pub fn new(inner: Arc<T>) -> Self {
        Config { inner }
    }

    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}

impl<T: Injectable> Config<T> {
    /// Binds `token` to the config of type `T` held by the [ConfigProvider] bound to `provider`
    ///
    /// The config is looked up when the token is first resolved. A missing config fails
    /// the resolution with [crate::errors::ConfigError::Missing].
    pub fn binding(token: &Token<Config<T>>, provider: &Token<ConfigProvider>) -> Binding {
        let provider = *provider;
        Binding::factory(token, [Dependency::on(&provider)], move |deps| {
            let config_provider = deps.get(&provider)?;
            let config = config_provider.require_config::<T>()?;
            Ok(Config { inner: config })
        })
    }
}
