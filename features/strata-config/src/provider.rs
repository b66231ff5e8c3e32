use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use strata_di::{types::TypeInfo, Binding, Injectable, Token};

use crate::{config::Config, errors::ConfigError};

/// A provider to register all configs.
///
/// Configs can be registered and retrieved based on type.
#[derive(Default)]
pub struct ConfigProvider {
    configs: HashMap<TypeId, (TypeInfo, Arc<dyn Any + Send + Sync + 'static>)>,
}

impl ConfigProvider {
    /// Initializes an empty Config Provider
    pub fn new() -> Self {
        Self {
            configs: HashMap::new(),
        }
    }

    /// Retrieve a config with specified type.
    ///
    /// Returns `Ok(None)` if no config of that type was registered
    pub fn get_config<T: Injectable>(&self) -> Result<Option<Arc<T>>, ConfigError> {
        let type_info = TypeInfo::of::<T>();

        self.configs
            .get(&type_info.type_id)
            .map(|(_, entry)| entry.clone().downcast::<T>())
            .transpose()
            .map_err(|_| ConfigError::Missing(type_info))
    }

    /// Retrieve a config with specified type, failing with [ConfigError::Missing] if it is unknown
    pub fn require_config<T: Injectable>(&self) -> Result<Arc<T>, ConfigError> {
        self.get_config::<T>()?
            .ok_or(ConfigError::Missing(TypeInfo::of::<T>()))
    }

    /// Add a config to the registry.
    ///
    /// If the config type is already registered, it will return a
    /// [`ConfigError`] runtime error
    pub fn add_config<T: Injectable>(&mut self, config: T) -> Result<&mut Self, ConfigError> {
        let type_info = TypeInfo::of::<T>();

        if self.configs.contains_key(&type_info.type_id) {
            return Err(ConfigError::AlreadyRegistered(type_info));
        }

        tracing::debug!("Registered config '{}'", type_info);
        self.configs
            .insert(type_info.type_id, (type_info, Arc::new(config)));
        Ok(self)
    }

    /// Can optionally add a config to the registry.
    ///
    /// If the config provided is `Some(T)`, it will be the same as calling
    /// [`ConfigProvider::add_config`]
    /// If the config provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_config<T: Injectable>(
        &mut self,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.add_config(c),
            None => Ok(self),
        }
    }

    /// Binds `token` directly to the registered config of type `T`
    ///
    /// Unlike [Config::binding] the config has to be registered already.
    pub fn binding<T: Injectable>(&self, token: &Token<Config<T>>) -> Result<Binding, ConfigError> {
        let config = self.require_config::<T>()?;
        Ok(Binding::value(token, Config::new(config)))
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl fmt::Debug for ConfigProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self
            .configs
            .values()
            .map(|(type_info, _)| type_info.type_name)
            .collect();
        names.sort_unstable();

        f.debug_struct("ConfigProvider")
            .field("configs", &names)
            .finish()
    }
}
