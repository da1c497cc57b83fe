use display_interface::DisplayError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unable to allocate {what}")]
    Allocation { what: &'static str },

    #[error("bus transfer failed: {0:?}")]
    Transport(DisplayError),

    #[error("panel initialization failed: {0:?}")]
    Initialization(DisplayError),

    #[error("invalid configuration: {0}")]
    Config(&'static str),

    #[error("palette register {0} out of range")]
    PaletteIndex(u32),
}

impl From<DisplayError> for Error {
    fn from(err: DisplayError) -> Self {
        Error::Transport(err)
    }
}

pub type Result<T> = core::result::Result<T, Error>;
