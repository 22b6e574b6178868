use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// Geometry that would corrupt quadrant placement (NaN, infinite, or negative extent).
    #[error("malformed entity geometry: x={x} y={y} width={width} height={height}")]
    MalformedEntity {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
