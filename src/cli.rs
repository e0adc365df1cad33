use clap::{Parser, Subcommand};

use crate::api::{portal::DEFAULT_BASE_URL, provident::Api, session::Credentials};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[clap(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check the credentials against the portal.
    #[clap(name = "login")]
    Login,

    /// List the utility groups and their meters.
    #[clap(name = "discover")]
    Discover,

    /// Fetch the consumption data once and print the current readings.
    #[clap(name = "fetch")]
    Fetch(FetchArgs),

    /// Keep refreshing the consumption data and log the sensor states.
    #[clap(name = "poll")]
    Poll(PollArgs),
}

#[derive(Parser)]
pub struct ConnectionArgs {
    /// Portal account username.
    #[clap(long, env = "PROVIDENT_USERNAME")]
    pub username: String,

    #[clap(long, env = "PROVIDENT_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[clap(long = "base-url", env = "PROVIDENT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Timeout of a single HTTP request.
    #[clap(long = "http-timeout", env = "PROVIDENT_HTTP_TIMEOUT", default_value = "10s")]
    pub http_timeout: humantime::Duration,
}

impl ConnectionArgs {
    pub fn new_api(&self) -> Api {
        Api::new(
            Credentials::new(&self.username, &self.password),
            &self.base_url,
            self.http_timeout.into(),
        )
    }
}

#[derive(Parser)]
pub struct FetchArgs {
    /// Upper limit of a single update cycle.
    #[clap(long = "cycle-timeout", env = "PROVIDENT_CYCLE_TIMEOUT", default_value = "30s")]
    pub cycle_timeout: humantime::Duration,
}

#[derive(Parser)]
pub struct PollArgs {
    #[clap(long = "interval", env = "PROVIDENT_SCAN_INTERVAL", default_value = "1h")]
    pub interval: humantime::Duration,

    #[clap(flatten)]
    pub fetch: FetchArgs,
}
