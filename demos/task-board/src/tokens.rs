//! Tokens shared by every module

use once_cell::sync::Lazy;
use strata_config::{config::Config, provider::ConfigProvider};
use strata_di::{Multiplicity, Scope, Token};

use crate::config::{BoardConfig, HttpConfig};

pub static CONFIG_PROVIDER: Lazy<Token<ConfigProvider>> =
    Lazy::new(|| Token::define("config_provider", Multiplicity::Single, Scope::Root));

pub static BOARD_CONFIG: Lazy<Token<Config<BoardConfig>>> =
    Lazy::new(|| Token::single("board_config"));

pub static HTTP_CONFIG: Lazy<Token<Config<HttpConfig>>> =
    Lazy::new(|| Token::single("http_config"));
