//! Command line [`Args`].

use clap::Parser;

/// GraphQL server of the time-bank exchange ledger.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// TOML file to load the configuration from, if it exists.
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: String,
}

impl Args {
    /// Reads [`Args`] of the current process.
    ///
    /// # Errors
    ///
    /// If the command line is malformed, or `--help` or `--version` is
    /// requested.
    pub fn parse() -> Result<Self, clap::Error> {
        Self::try_parse()
    }
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::Args;

    #[test]
    fn config_defaults_to_local_file() {
        let args = Args::try_parse_from(["server"]).unwrap();

        assert_eq!(args.config, "config.toml");
    }

    #[test]
    fn config_may_be_overridden() {
        let args =
            Args::try_parse_from(["server", "-c", "/etc/timebank.toml"])
                .unwrap();

        assert_eq!(args.config, "/etc/timebank.toml");
    }
}
