#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod coordinator;
mod core;
mod prelude;
mod sensor;
mod tables;

use chrono::{DateTime, Local};
use clap::{Parser, crate_version};
use tokio::task::spawn_blocking;
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Args, Command, ConnectionArgs},
    coordinator::{ConsumptionByName, Coordinator},
    prelude::*,
    sensor::Sensor,
    tables::{build_consumption_table, build_groups_table},
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();

    match args.command {
        Command::Login => {
            let title = login(&args.connection).await?;
            println!("{title}");
        }
        Command::Discover => {
            let mut api = args.connection.new_api();
            let groups = spawn_blocking(move || api.get_utility_groups())
                .await?
                .context("failed to discover the utilities")?;
            println!("{}", build_groups_table(&groups));
        }
        Command::Fetch(fetch_args) => {
            let mut coordinator = Coordinator::builder()
                .api(args.connection.new_api())
                .cycle_timeout(fetch_args.cycle_timeout)
                .build();
            coordinator.set_up().await?;
            println!("{}", build_consumption_table(coordinator.data(), Local::now()));
        }
        Command::Poll(poll_args) => {
            let mut coordinator = Coordinator::builder()
                .api(args.connection.new_api())
                .interval(poll_args.interval)
                .cycle_timeout(poll_args.fetch.cycle_timeout)
                .build();
            coordinator.set_up().await?;
            let sensors = Sensor::discover(coordinator.data());
            info!(n_sensors = sensors.len(), "discovered");
            log_sensors(&sensors, coordinator.data(), Local::now());
            coordinator.run(|data| log_sensors(&sensors, data, Local::now())).await;
        }
    }

    info!("done!");
    Ok(())
}

/// Validate the credentials and return the account title.
async fn login(connection: &ConnectionArgs) -> Result<String> {
    let mut api = connection.new_api();
    let api = spawn_blocking(move || {
        api.login();
        api
    })
    .await?;
    ensure!(api.is_authenticated(), "invalid auth");
    Ok(account_title(api.credentials().username.as_str()))
}

fn account_title(username: &str) -> String {
    format!("Provident Energy ({username})")
}

fn log_sensors(sensors: &[Sensor], data: &ConsumptionByName, now: DateTime<Local>) {
    for sensor in sensors {
        let attributes = sensor.attributes(data, now);
        let attributes = serde_json::to_string(&attributes).unwrap_or_default();
        match sensor.native_value(data, now) {
            Some(value) => info!(
                name = %sensor.name,
                unique_id = %sensor.unique_id,
                unit = sensor.unit(),
                device_class = ?sensor.device_class(),
                state_class = ?sensor.state_class(),
                %attributes,
                "{value}"
            ),
            None => debug!(name = %sensor.name, %attributes, "unavailable"),
        }
    }
}
