//! Tests for registering configs and injecting them

use std::sync::Arc;

use pretty_assertions::assert_eq;
use strata_di::{types::TypeInfo, Dependency, Injector, ResolveError, Token};

use crate::{config::Config, errors::ConfigError, provider::ConfigProvider};

#[derive(Debug, Clone, PartialEq)]
struct StoreConfig {
    capacity: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct HttpConfig {
    base_url: String,
}

#[test]
fn test_add_and_get_config() {
    let mut provider = ConfigProvider::new();
    provider
        .add_config(StoreConfig { capacity: 10 })
        .unwrap()
        .maybe_add_config::<HttpConfig>(None)
        .unwrap();

    assert_eq!(
        provider.get_config::<StoreConfig>().unwrap().as_deref(),
        Some(&StoreConfig { capacity: 10 })
    );
    assert_eq!(provider.get_config::<HttpConfig>().unwrap(), None);
    assert_eq!(provider.len(), 1);
}

#[test]
fn test_config_registered_twice() {
    let mut provider = ConfigProvider::new();
    provider.add_config(StoreConfig { capacity: 1 }).unwrap();

    let err = provider.add_config(StoreConfig { capacity: 2 }).unwrap_err();
    assert_eq!(err, ConfigError::AlreadyRegistered(TypeInfo::of::<StoreConfig>()));
    assert_eq!(provider.require_config::<StoreConfig>().unwrap().capacity, 1);
}

#[test]
fn test_missing_config() {
    let provider = ConfigProvider::new();

    assert_eq!(
        provider.require_config::<StoreConfig>().unwrap_err(),
        ConfigError::Missing(TypeInfo::of::<StoreConfig>())
    );

    let token: Token<Config<StoreConfig>> = Token::single("store_config");
    assert!(provider.binding(&token).is_err());
}

#[test]
fn test_value_binding_from_provider() {
    let mut provider = ConfigProvider::new();
    provider
        .add_config(HttpConfig {
            base_url: "http://localhost".to_string(),
        })
        .unwrap();

    let http_config: Token<Config<HttpConfig>> = Token::single("http_config");
    let root = Injector::root_with([provider.binding(&http_config).unwrap()]).unwrap();

    assert_eq!(root.get(&http_config).unwrap().base_url, "http://localhost");
}

#[test]
fn test_config_resolved_through_provider_token() {
    let providers: Token<ConfigProvider> = Token::single("config_provider");
    let store_config: Token<Config<StoreConfig>> = Token::single("store_config");
    let capacity: Token<usize> = Token::single("capacity");

    let mut provider = ConfigProvider::new();
    provider.add_config(StoreConfig { capacity: 64 }).unwrap();

    let root = Injector::builder()
        .add_value(&providers, provider)
        .add(Config::binding(&store_config, &providers))
        .add_factory(&capacity, [Dependency::on(&store_config)], move |deps| {
            Ok(deps.get(&store_config)?.capacity)
        })
        .build()
        .unwrap();

    assert_eq!(*root.get(&capacity).unwrap(), 64);
    let config = root.get(&store_config).unwrap();
    assert!(Arc::ptr_eq(&config.inner(), &root.get(&store_config).unwrap().inner()));
}

#[test]
fn test_child_overrides_config() {
    let store_config: Token<Config<StoreConfig>> = Token::single("store_config");

    let mut defaults = ConfigProvider::new();
    defaults.add_config(StoreConfig { capacity: 8 }).unwrap();
    let mut overrides = ConfigProvider::new();
    overrides.add_config(StoreConfig { capacity: 128 }).unwrap();

    let root = Injector::root_with([defaults.binding(&store_config).unwrap()]).unwrap();
    let child = root
        .create_child([overrides.binding(&store_config).unwrap()])
        .unwrap();

    assert_eq!(root.get(&store_config).unwrap().capacity, 8);
    assert_eq!(child.get(&store_config).unwrap().capacity, 128);
}

#[test]
fn test_missing_config_fails_resolution() {
    let providers: Token<ConfigProvider> = Token::single("config_provider");
    let store_config: Token<Config<StoreConfig>> = Token::single("store_config");

    let root = Injector::root_with([
        strata_di::Binding::value(&providers, ConfigProvider::new()),
        Config::binding(&store_config, &providers),
    ])
    .unwrap();

    let err = root.get(&store_config).unwrap_err();
    assert!(matches!(err, ResolveError::FactoryFailed { .. }));
    assert_eq!(
        err.factory_error().unwrap().downcast_ref::<ConfigError>(),
        Some(&ConfigError::Missing(TypeInfo::of::<StoreConfig>()))
    );
}
