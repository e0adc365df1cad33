//! [Provident Energy](https://provident.meterconnex.com) metering portal client.

use std::time::Duration;

use chrono::{Local, NaiveDate};

use crate::{
    api::{
        portal::{HttpPortal, Portal, is_unauthorized},
        session::{Credentials, Session},
    },
    core::{
        consumption::{Consumption, Window},
        utility::{Utility, UtilityGroup},
    },
    prelude::*,
};

/// Extra attempts after the portal has rejected the session.
const MAX_REAUTH_RETRIES: usize = 1;

/// Consumption paired with the utility ID, in discovery order.
pub type ConsumptionById = Vec<(String, Consumption)>;

pub struct Api<P = HttpPortal> {
    portal: P,
    credentials: Credentials,
    session: Session,
}

impl Api {
    pub fn new(credentials: Credentials, base_url: &str, timeout: Duration) -> Self {
        Self::with_portal(HttpPortal::new(base_url, timeout), credentials)
    }
}

impl<P: Portal> Api<P> {
    pub fn with_portal(portal: P, credentials: Credentials) -> Self {
        Self { portal, credentials, session: Session::default() }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[cfg(test)]
    pub const fn portal(&self) -> &P {
        &self.portal
    }

    /// Establish the transport-level cookies.
    ///
    /// Leaves the authentication flag untouched.
    pub fn initialize(&mut self) -> bool {
        match self.portal.warm_up() {
            Ok(()) => true,
            Err(error) => {
                error!("failed to initialize the session: {error:#}");
                false
            }
        }
    }

    /// Log in from scratch.
    ///
    /// Success is signalled by the session cookie, not by the HTTP status alone.
    #[instrument(skip_all, fields(username = %self.credentials.username))]
    pub fn login(&mut self) -> bool {
        info!("logging in…");
        self.initialize();

        // Warming up has dropped the old cookies anyway:
        self.session.invalidate();

        match self.portal.log_in(&self.credentials) {
            Ok(true) => {
                self.session.authenticate();
                info!("logged in");
                true
            }
            Ok(false) => {
                error!("no session cookie received");
                false
            }
            Err(error) => {
                error!("failed to log in: {error:#}");
                false
            }
        }
    }

    /// Get the utility groups, or nothing when discovery has failed.
    #[instrument(skip_all)]
    pub fn get_utility_groups(&mut self) -> Option<Vec<UtilityGroup>> {
        if !self.check_auth() {
            error!("failed to authenticate");
            return None;
        }
        info!("fetching…");
        let groups = self
            .call_authorized(Portal::get_root_nodes)
            .and_then(UtilityGroup::try_from_nodes)
            .inspect_err(|error| error!("failed to get the utilities: {error:#}"))
            .ok()?;
        info!(n_groups = groups.len(), "fetched");
        Some(groups)
    }

    /// Get yesterday's and today's hourly consumption of the utility.
    pub fn get_utility_consumption(&mut self, utility: &Utility) -> Option<Consumption> {
        self.get_utility_consumption_on(utility, Local::now().date_naive())
    }

    #[instrument(skip_all, fields(utility = %utility, today = %today))]
    pub fn get_utility_consumption_on(
        &mut self,
        utility: &Utility,
        today: NaiveDate,
    ) -> Option<Consumption> {
        if !self.check_auth() {
            error!("failed to authenticate");
            return None;
        }
        info!("fetching…");
        let consumption = Window::around(today)
            .and_then(|window| {
                let mut graphs =
                    self.call_authorized(|portal| portal.get_quick_graphs(&utility.id, window))?;
                ensure!(!graphs.is_empty(), "no consumption data found");
                Ok(Consumption::new(utility.clone(), graphs.swap_remove(0), window))
            })
            .inspect_err(|error| error!("failed to get the consumption: {error:#}"))
            .ok()?;
        debug!(?consumption, "fetched");
        Some(consumption)
    }

    /// Get the consumption of every discovered utility.
    ///
    /// Utilities which failed to fetch are skipped.
    #[instrument(skip_all)]
    pub fn get_consumption_data(&mut self) -> ConsumptionById {
        if !self.check_auth() {
            error!("failed to authenticate");
            return ConsumptionById::new();
        }
        let Some(groups) = self.get_utility_groups() else {
            error!("failed to get the utilities");
            return ConsumptionById::new();
        };
        let consumption_data: ConsumptionById = groups
            .iter()
            .flat_map(|group| &group.utilities)
            .filter_map(|utility| {
                self.get_utility_consumption(utility)
                    .map(|consumption| (utility.id.clone(), consumption))
            })
            .collect();
        info!(n_utilities = consumption_data.len(), "fetched all consumption");
        consumption_data
    }

    /// Log in unless already authenticated.
    fn check_auth(&mut self) -> bool {
        self.session.is_authenticated() || self.login()
    }

    /// Make the call, logging in again and retrying once if the session has expired.
    fn call_authorized<T>(&mut self, mut call: impl FnMut(&mut P) -> Result<T>) -> Result<T> {
        let mut n_retries = 0;
        loop {
            let error = match call(&mut self.portal) {
                Ok(value) => return Ok(value),
                Err(error) if is_unauthorized(&error) => error,
                Err(error) => return Err(error),
            };
            self.session.invalidate();
            if n_retries == MAX_REAUTH_RETRIES {
                return Err(error.context("still unauthorized after logging in again"));
            }
            n_retries += 1;
            info!("session expired, logging in again…");
            if !self.login() {
                return Err(error.context("failed to log in again"));
            }
        }
    }
}
