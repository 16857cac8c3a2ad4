use crate::engine::{Engine, EngineConfig, EngineError, Http, Random, Uci, UciError};
use crate::io::Process;

/// Trait for types that build other types.
pub trait Build {
    /// The type to be built.
    type Output;

    /// The reason why [`Build::Output`] could not be built.
    type Error;

    /// Build an instance of [`Build::Output`].
    fn build(self) -> Result<Self::Output, Self::Error>;
}

impl Build for EngineConfig {
    type Output = Engine;
    type Error = EngineError;

    fn build(self) -> Result<Self::Output, Self::Error> {
        match self {
            EngineConfig::Http(url) => Ok(Http::new(&url).into()),
            EngineConfig::Random() => Ok(Random::default().into()),
            EngineConfig::Uci(path, options) => {
                let io = Process::spawn(&path).map_err(UciError::from)?;
                Ok(Uci::new(io, options).into())
            }
        }
    }
}
