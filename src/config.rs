use crate::scorer::Algorithm;
use ::config::builder::{ConfigBuilder, DefaultState};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use thiserror::Error;

const ENV_PREFIX: &str = "RENDEZVOUS";
const DEFAULT_CONFIG_FILE: &str = "rendezvous";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default, deserialize_with = "node_list")]
    pub nodes: Vec<String>,
    #[serde(default)]
    pub algorithm: Algorithm,
    #[serde(default = "default_log")]
    pub log: String,
    #[serde(default)]
    pub json_log: bool,
}

fn default_log() -> String {
    "info".to_owned()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NodeList {
    List(Vec<String>),
    Joined(String),
}

/// Nodes are a list in config files, but a comma separated string in env vars
fn node_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NodeList::deserialize(deserializer)? {
        NodeList::List(nodes) => nodes,
        NodeList::Joined(joined) if joined.is_empty() => vec![],
        NodeList::Joined(joined) => joined.split(',').map(|node| node.trim().to_owned()).collect(),
    })
}

/// `RENDEZVOUS_*` env vars. Values are left as strings (no number or bool
/// guessing) so a node called `10` or `true` stays a node name.
fn environment() -> ::config::Environment {
    ::config::Environment::with_prefix(ENV_PREFIX)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no nodes configured - set RENDEZVOUS_NODES or pass --node")]
    NoNodes,
    #[error("node {0} has an empty name")]
    EmptyNode(usize),
}

impl Config {
    /// Load config from a file (the given path, or `rendezvous.{toml,yaml,json}`
    /// in the working directory if present) and then `RENDEZVOUS_*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let file = match path {
            Some(path) => ::config::File::from(path).required(true),
            None => ::config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Self::build(::config::Config::builder().add_source(file).add_source(environment()))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Config> {
        let config: Config = builder
            .build()
            .context("reading configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        Ok(config)
    }

    /// Nodes must be non-empty strings and there must be at least one of them
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes.is_empty() {
            return Err(ConfigError::NoNodes);
        }

        if let Some(pos) = self.nodes.iter().position(|node| node.trim().is_empty()) {
            return Err(ConfigError::EmptyNode(pos));
        }

        Ok(())
    }

    /// Command line flags win over the file and env vars
    pub fn override_with<I>(&mut self, nodes: Option<I>, algorithm: Option<Algorithm>)
    where
        I: IntoIterator<Item = String>,
    {
        if let Some(nodes) = nodes {
            self.nodes = nodes.into_iter().collect();
        }

        if let Some(algorithm) = algorithm {
            self.algorithm = algorithm;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ::config::{File, FileFormat, Map};

    fn from_toml(toml: &str) -> Result<Config> {
        Config::build(::config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn from_env(toml: &str, vars: &[(&str, &str)]) -> Result<Config> {
        let vars: Map<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Config::build(
            ::config::Config::builder()
                .add_source(File::from_str(toml, FileFormat::Toml))
                .add_source(environment().source(Some(vars))),
        )
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("").unwrap();

        assert!(config.nodes.is_empty());
        assert_eq!(config.algorithm, Algorithm::Castagnoli);
        assert_eq!(config.log, "info");
        assert!(!config.json_log);
        assert_eq!(config.validate(), Err(ConfigError::NoNodes));
    }

    #[test]
    fn test_from_file() {
        let config = from_toml(
            r#"
            nodes = ["cache-0:11211", "cache-1:11211"]
            algorithm = "xxh3"
            log = "rendezvous_hash=debug"
            json_log = true
            "#,
        )
        .unwrap();

        assert_eq!(config.nodes, vec!["cache-0:11211", "cache-1:11211"]);
        assert_eq!(config.algorithm, Algorithm::Xxh3);
        assert_eq!(config.log, "rendezvous_hash=debug");
        assert!(config.json_log);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_bad_algorithm() {
        assert!(from_toml(r#"algorithm = "md5""#).is_err());
    }

    #[test]
    fn test_empty_node_name() {
        let config = from_toml(r#"nodes = ["a", " ", "c"]"#).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::EmptyNode(1)));
    }

    #[test]
    fn test_env_nodes() {
        let config = from_env("", &[("RENDEZVOUS_NODES", "a,b")]).unwrap();
        assert_eq!(config.nodes, vec!["a", "b"]);

        let config = from_env("", &[("RENDEZVOUS_NODES", "cache-0:11211, cache-1:11211")]).unwrap();
        assert_eq!(config.nodes, vec!["cache-0:11211", "cache-1:11211"]);
    }

    #[test]
    fn test_env_single_node_that_looks_like_a_scalar() {
        for name in ["10", "true", "1.5", "cache-0"] {
            let config = from_env("", &[("RENDEZVOUS_NODES", name)]).unwrap();
            assert_eq!(config.nodes, vec![name]);
        }
    }

    #[test]
    fn test_env_overrides_file() {
        let config = from_env(
            r#"
            nodes = ["from-file"]
            algorithm = "castagnoli"
            "#,
            &[
                ("RENDEZVOUS_NODES", "from-env"),
                ("RENDEZVOUS_ALGORITHM", "xxh3"),
                ("RENDEZVOUS_JSON_LOG", "true"),
                ("RENDEZVOUS_LOG", "debug"),
            ],
        )
        .unwrap();

        assert_eq!(config.nodes, vec!["from-env"]);
        assert_eq!(config.algorithm, Algorithm::Xxh3);
        assert!(config.json_log);
        assert_eq!(config.log, "debug");
    }

    #[test]
    fn test_env_empty_nodes() {
        let config = from_env("", &[("RENDEZVOUS_NODES", "")]).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::NoNodes));

        let config = from_env("", &[("RENDEZVOUS_NODES", "a,,b")]).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::EmptyNode(1)));
    }

    #[test]
    fn test_load_from_process_env() {
        // the only test that touches the real environment
        std::env::set_var("RENDEZVOUS_NODES", "10");
        let single = Config::load(None);
        std::env::set_var("RENDEZVOUS_NODES", "a,b");
        let pair = Config::load(None);
        std::env::remove_var("RENDEZVOUS_NODES");

        assert_eq!(single.unwrap().nodes, vec!["10"]);
        assert_eq!(pair.unwrap().nodes, vec!["a", "b"]);
    }

    #[test]
    fn test_override_with() {
        let mut config = from_toml(r#"nodes = ["a", "b"]"#).unwrap();

        config.override_with(None::<Vec<String>>, None);
        assert_eq!(config.nodes, vec!["a", "b"]);
        assert_eq!(config.algorithm, Algorithm::Castagnoli);

        config.override_with(Some(vec!["c".to_owned()]), Some(Algorithm::Xxh3));
        assert_eq!(config.nodes, vec!["c"]);
        assert_eq!(config.algorithm, Algorithm::Xxh3);
    }
}
