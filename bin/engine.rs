use crate::io::Process;
use async_trait::async_trait;
use derive_more::{DebugCustom, Display, Error, From};
use lib::engine::{Engine as _, EngineReply, EngineRequest};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

mod http;
mod random;
mod uci;

pub use self::http::*;
pub use self::random::*;
pub use self::uci::*;

/// The reason why parsing engine configuration failed.
#[derive(Debug, Display, Eq, PartialEq, Error, From)]
#[display(fmt = "failed to parse engine configuration")]
pub struct ParseEngineConfigError(ron::de::SpannedError);

/// Runtime configuration for an [`Engine`].
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(deny_unknown_fields, rename_all = "lowercase")]
pub enum EngineConfig {
    /// An engine service reachable at the given base url.
    Http(String),

    /// Uniformly random legal moves.
    Random(),

    /// A UCI engine at the given path.
    Uci(String, #[serde(default)] UciOptions),
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::Random()
    }
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ron::ser::to_string(self).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for EngineConfig {
    type Err = ParseEngineConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ron::de::from_str(s)?)
    }
}

/// The reason why [`Engine`] failed to reply.
#[derive(Debug, Display, Error, From)]
pub enum EngineError {
    Http(HttpError),
    Random(RandomError),
    Uci(UciError),
}

/// A generic opponent.
#[derive(DebugCustom, From)]
pub enum Engine {
    #[debug(fmt = "{:?}", _0)]
    Http(Http),
    #[debug(fmt = "{:?}", _0)]
    Random(Random),
    #[debug(fmt = "{:?}", _0)]
    Uci(Uci<Process>),
}

#[async_trait]
impl lib::engine::Engine for Engine {
    type Error = EngineError;

    async fn play(&mut self, req: &EngineRequest) -> Result<EngineReply, Self::Error> {
        match self {
            Engine::Http(e) => Ok(e.play(req).await?),
            Engine::Random(e) => Ok(e.play(req).await?),
            Engine::Uci(e) => Ok(e.play(req).await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn parsing_printed_engine_config_is_an_identity(c: EngineConfig) {
        assert_eq!(c.to_string().parse(), Ok(c));
    }

    #[proptest]
    fn http_config_is_deserializable(url: String) {
        assert_eq!(
            format!("http({:?})", url).parse(),
            Ok(EngineConfig::Http(url))
        );
    }

    #[test]
    fn random_config_is_deserializable() {
        assert_eq!("random()".parse(), Ok(EngineConfig::Random()));
    }

    #[proptest]
    fn uci_config_is_deserializable(p: String, o: UciOptions) {
        assert_eq!(
            format!("uci({:?})", p).parse(),
            Ok(EngineConfig::Uci(p.clone(), UciOptions::default()))
        );

        assert_eq!(
            format!("uci({:?}, {})", p, ron::ser::to_string(&o)?).parse(),
            Ok(EngineConfig::Uci(p, o))
        );
    }

    #[proptest]
    fn parsing_unknown_engine_fails(#[filter(!["http", "random", "uci"].contains(&#s.as_str()))] #[strategy("[a-z]+")] s: String) {
        assert!(format!("{s}()").parse::<EngineConfig>().is_err());
    }
}
