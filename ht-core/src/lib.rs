pub mod config;
pub mod mask;
pub mod model;
pub mod report;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidSetting {
        name: String,
        value: String,
        reason: String,
    },
}
