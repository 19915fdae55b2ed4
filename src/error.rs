use thiserror::Error;

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("cannot merge a numeric extent with a categorical extent")]
    MixedExtent,

    #[error("plot surface has no completed draw pass")]
    NotDrawn,

    #[error("invalid run selection: {0}")]
    RunSelection(String),
}
