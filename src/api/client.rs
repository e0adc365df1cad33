use std::time::Duration;

use ureq::Agent;

/// Browser user agent, the portal rejects unknown clients.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:139.0) Gecko/20100101 Firefox/139.0";

/// Build a fresh agent with an empty cookie jar.
#[must_use]
pub fn new_agent(timeout: Duration) -> Agent {
    Agent::config_builder().timeout_global(Some(timeout)).user_agent(USER_AGENT).build().into()
}
