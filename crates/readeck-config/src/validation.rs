use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid cidr {0}: {1}")]
    InvalidCidr(String, ipnet::AddrParseError),

    #[error("site config root {0:?} does not exist")]
    MissingSiteConfigRoot(std::path::PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
