// Copyright 2025 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::config_err;

pub const DEFAULT_END_SYMBOL: &str = "end";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Name that resolves to the size of the dimension being indexed.
    pub end_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            end_symbol: DEFAULT_END_SYMBOL.to_owned(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Config> {
        let config: Config = match serde_json::from_str(json) {
            Ok(config) => config,
            Err(err) => return config_err!(BadConfig, err.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.end_symbol.trim().is_empty() {
            return config_err!(BadConfig, "endSymbol must not be empty".to_owned());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ErrorCode, ErrorKind};

    #[test]
    fn test_defaults() {
        assert_eq!("end", Config::default().end_symbol);
        assert_eq!(Config::default(), Config::from_json("{}").unwrap());
    }

    #[test]
    fn test_from_json() {
        let config = Config::from_json(r#"{"endSymbol": "last"}"#).unwrap();
        assert_eq!("last", config.end_symbol);

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(r#"{"endSymbol":"last"}"#, json);
    }

    #[test]
    fn test_rejects_bad_config() {
        let err = Config::from_json(r#"{"endSymbol": "  "}"#).unwrap_err();
        assert_eq!(ErrorKind::Config, err.kind);
        assert_eq!(ErrorCode::BadConfig, err.code);

        let err = Config::from_json("not json").unwrap_err();
        assert_eq!(ErrorCode::BadConfig, err.code);
    }
}
