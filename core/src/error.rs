use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("canned query error: {0}")]
    CannedQuery(#[from] CannedQueryError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("invalid category json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("category json is not an object")]
    NotAnObject,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CannedQueryError {
    #[error("not a scope:// uri: {0}")]
    InvalidScheme(String),

    #[error("missing scope id in uri: {0}")]
    MissingScopeId(String),

    #[error("invalid filter state: {0}")]
    InvalidFilterState(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
