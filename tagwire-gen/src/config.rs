//! Generator parameters passed through the `protoc` parameter string.

/// Parsed generator configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Requested plugins, e.g. `grpc`. Carried for downstream tooling; no
    /// service stubs are generated.
    pub plugins: Vec<String>,
    /// Embed the raw file descriptor in generated modules.
    pub gen_descriptors: bool,
    /// Collapse single-field `XxxValue` wrapper messages into their payload
    /// type.
    pub using_value_wrappers: bool,
}

impl Config {
    /// Parse the comma separated `key=value` option list.
    ///
    /// Unknown options are ignored for forward compatibility.
    pub fn parse(parameter: &str) -> Self {
        let mut config = Config::default();
        for token in parameter.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let (key, value) = token.split_once('=').unwrap_or((token, ""));
            match key {
                "plugins" => {
                    config.plugins = value
                        .split('+')
                        .filter(|plugin| !plugin.is_empty())
                        .map(str::to_owned)
                        .collect();
                }
                "gen_descriptors" => config.gen_descriptors = value == "true",
                "using_value_wrappers" => config.using_value_wrappers = value == "true",
                _ => {}
            }
        }
        config
    }
}
