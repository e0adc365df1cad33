#[cfg(test)]
pub mod fake;

use std::time::Duration;

use ureq::Agent;

use crate::{
    api::{
        client,
        models::{LoginRequest, Node, QuickGraph},
        session::Credentials,
    },
    core::consumption::Window,
    prelude::*,
};

pub const DEFAULT_BASE_URL: &str = "https://provident.meterconnex.com";

const LOGIN_PATH: &str = "/login/LoginService.aspx/ProcessLogin";
const ROOT_NODES_PATH: &str = "/api/internal/metertree/rootnodes";
const QUICK_GRAPHS_PATH: &str = "/api/internal/graphs/quickgraphs";

/// Cookie the portal sets on successful login.
pub const SESSION_COOKIE: &str = "ASP.NET_SessionId";

/// Raw calls to the metering portal.
///
/// Errors are returned as-is: the caller decides what is retryable.
pub trait Portal {
    /// Start over with an empty cookie jar and visit the landing page.
    fn warm_up(&mut self) -> Result;

    /// Post the credentials and tell whether the session cookie has been received.
    fn log_in(&mut self, credentials: &Credentials) -> Result<bool>;

    fn get_root_nodes(&mut self) -> Result<Vec<Node>>;

    fn get_quick_graphs(&mut self, meter_id: &str, window: Window) -> Result<Vec<QuickGraph>>;
}

/// Whether the portal has rejected the session.
#[must_use]
pub fn is_unauthorized(error: &Error) -> bool {
    error.chain().any(|cause| {
        matches!(cause.downcast_ref::<ureq::Error>(), Some(ureq::Error::StatusCode(401)))
    })
}

pub struct HttpPortal {
    agent: Agent,
    base_url: String,
    timeout: Duration,
}

impl HttpPortal {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            agent: client::new_agent(timeout),
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn has_session_cookie(&self) -> bool {
        self.agent.cookie_jar_lock().iter().any(|cookie| cookie.name() == SESSION_COOKIE)
    }
}

impl Portal for HttpPortal {
    #[instrument(skip_all, level = Level::DEBUG, fields(base_url = %self.base_url))]
    fn warm_up(&mut self) -> Result {
        self.agent = client::new_agent(self.timeout);
        self.agent.get(&self.base_url).call().context("failed to open the landing page")?;
        Ok(())
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(username = %credentials.username))]
    fn log_in(&mut self, credentials: &Credentials) -> Result<bool> {
        self.agent
            .post(self.url(LOGIN_PATH))
            .send_json(LoginRequest {
                username: &credentials.username,
                password: &credentials.password,
                remember_me: false,
            })
            .context("failed to post the credentials")?;
        Ok(self.has_session_cookie())
    }

    #[instrument(skip_all, level = Level::DEBUG)]
    fn get_root_nodes(&mut self) -> Result<Vec<Node>> {
        self.agent
            .get(self.url(ROOT_NODES_PATH))
            .header("Content-Type", "application/json")
            .query("depth", "2")
            .call()
            .context("failed to request the meter tree")?
            .body_mut()
            .read_json()
            .context("failed to deserialize the meter tree")
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(meter_id = meter_id))]
    fn get_quick_graphs(&mut self, meter_id: &str, window: Window) -> Result<Vec<QuickGraph>> {
        self.agent
            .get(self.url(QUICK_GRAPHS_PATH))
            .header("Content-Type", "application/json")
            .query("aggregateGroups", "true")
            .query("meterlist", meter_id)
            .query("startDate", window.start.format("%Y-%m-%d").to_string())
            .query("endDate", window.end.format("%Y-%m-%d").to_string())
            .call()
            .with_context(|| format!("failed to request the quick graphs for `{meter_id}`"))?
            .body_mut()
            .read_json()
            .with_context(|| format!("failed to deserialize the quick graphs for `{meter_id}`"))
    }
}
