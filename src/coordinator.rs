use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use bon::Builder;
use tokio::{
    task::spawn_blocking,
    time::{MissedTickBehavior, interval, timeout},
};

use crate::{
    api::{portal::Portal, provident::Api},
    core::consumption::Consumption,
    prelude::*,
};

pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(3600);

/// Consumption keyed by the cleaned utility name.
pub type ConsumptionByName = BTreeMap<String, Consumption>;

/// Periodically refreshes the consumption data.
///
/// The client sits behind a mutex: a cycle which has timed out keeps running in the background,
/// and the next one waits for it to release the client.
#[derive(Builder)]
pub struct Coordinator<P: Portal + Send + 'static> {
    #[builder(with = |api: Api<P>| Arc::new(Mutex::new(api)))]
    api: Arc<Mutex<Api<P>>>,

    #[builder(into, default = DEFAULT_SCAN_INTERVAL)]
    interval: Duration,

    #[builder(into)]
    cycle_timeout: Duration,

    /// Last successfully fetched data.
    #[builder(skip)]
    data: ConsumptionByName,
}

impl<P: Portal + Send + 'static> Coordinator<P> {
    #[must_use]
    pub const fn data(&self) -> &ConsumptionByName {
        &self.data
    }

    /// Log in eagerly and fetch the initial data.
    #[instrument(skip_all)]
    pub async fn set_up(&mut self) -> Result {
        let api = Arc::clone(&self.api);
        let is_logged_in = spawn_blocking(move || Ok::<_, Error>(lock(&api)?.login()))
            .await
            .context("the login task has failed")??;
        if !is_logged_in {
            warn!("initial login failed, the first refresh will retry");
        }
        self.refresh().await.context("the first refresh has failed")
    }

    /// Run a single update cycle.
    ///
    /// The previous data is kept when the cycle fails.
    #[instrument(skip_all)]
    pub async fn refresh(&mut self) -> Result {
        let api = Arc::clone(&self.api);
        let task = spawn_blocking(move || -> Result<ConsumptionByName> {
            let data = lock(&api)?.get_consumption_data();
            Ok(by_utility_name(data.into_iter().map(|(_, consumption)| consumption)))
        });
        let data = timeout(self.cycle_timeout, task)
            .await
            .with_context(|| format!("the update has not finished in {:?}", self.cycle_timeout))?
            .context("the update task has failed")??;
        ensure!(!data.is_empty(), "failed to get consumption data");
        info!(n_utilities = data.len(), "refreshed");
        self.data = data;
        Ok(())
    }

    /// Refresh the data on the interval, calling back after every successful cycle.
    pub async fn run(mut self, mut on_refresh: impl FnMut(&ConsumptionByName)) {
        let mut interval = interval(self.interval);
        interval.reset_after(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match self.refresh().await {
                Ok(()) => on_refresh(&self.data),
                Err(error) => error!("error communicating with the API: {error:#}"),
            }
        }
    }
}

fn lock<P>(api: &Mutex<Api<P>>) -> Result<MutexGuard<'_, Api<P>>> {
    api.lock().map_err(|_| anyhow!("the client has been poisoned"))
}

/// Re-key by the utility name, the last discovered utility wins.
fn by_utility_name(consumptions: impl IntoIterator<Item = Consumption>) -> ConsumptionByName {
    consumptions
        .into_iter()
        .map(|consumption| (consumption.utility_name.clone(), consumption))
        .collect()
}
