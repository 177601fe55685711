// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::env;

const DEFAULT_NAMESPACE: &str = "default";

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace the deployment operations run against
    pub namespace: String,
}

impl Config {
    /// Load configuration from environment variables. Every variable has a
    /// default, so loading never fails.
    pub fn from_env() -> Self {
        let namespace =
            env::var("KUBEDEPLOY_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string());

        Config { namespace }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_defaults_and_overrides() {
        env::remove_var("KUBEDEPLOY_NAMESPACE");
        assert_eq!(Config::from_env().namespace, "default");

        env::set_var("KUBEDEPLOY_NAMESPACE", "staging");
        assert_eq!(Config::from_env().namespace, "staging");

        env::remove_var("KUBEDEPLOY_NAMESPACE");
    }
}
