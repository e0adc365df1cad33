use std::{collections::VecDeque, thread::sleep, time::Duration};

use crate::{
    api::{
        models::{Node, QuickGraph},
        portal::Portal,
        session::Credentials,
    },
    core::consumption::{N_READINGS, Window},
    prelude::*,
};

/// Scripted in-memory portal.
///
/// Every call pops the next queued response; logins succeed unless told otherwise.
#[derive(Default)]
pub struct FakePortal {
    pub logins: VecDeque<Result<bool>>,
    pub root_nodes: VecDeque<Result<Vec<Node>>>,
    pub quick_graphs: VecDeque<Result<Vec<QuickGraph>>>,

    /// Makes every data call block for a while.
    pub latency: Option<Duration>,

    pub n_warm_ups: usize,
    pub n_logins: usize,
    pub n_root_node_calls: usize,
    pub quick_graph_calls: Vec<(String, Window)>,
}

impl FakePortal {
    pub fn unauthorized() -> Error {
        ureq::Error::StatusCode(401).into()
    }

    pub fn with_root_nodes(mut self, response: Result<Vec<Node>>) -> Self {
        self.root_nodes.push_back(response);
        self
    }

    pub fn with_quick_graphs(mut self, response: Result<Vec<QuickGraph>>) -> Self {
        self.quick_graphs.push_back(response);
        self
    }

    pub fn with_login(mut self, response: Result<bool>) -> Self {
        self.logins.push_back(response);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn wait(&self) {
        if let Some(latency) = self.latency {
            sleep(latency);
        }
    }
}

impl Portal for FakePortal {
    fn warm_up(&mut self) -> Result {
        self.n_warm_ups += 1;
        Ok(())
    }

    fn log_in(&mut self, _credentials: &Credentials) -> Result<bool> {
        self.n_logins += 1;
        self.logins.pop_front().unwrap_or(Ok(true))
    }

    fn get_root_nodes(&mut self) -> Result<Vec<Node>> {
        self.n_root_node_calls += 1;
        self.wait();
        self.root_nodes.pop_front().context("unexpected root nodes call")?
    }

    fn get_quick_graphs(&mut self, meter_id: &str, window: Window) -> Result<Vec<QuickGraph>> {
        self.quick_graph_calls.push((meter_id.to_owned(), window));
        self.wait();
        self.quick_graphs.pop_front().context("unexpected quick graphs call")?
    }
}

/// One group `g1` with the given `(id, text, title)` meters.
pub fn meter_tree(meters: &[(&str, &str, &str)]) -> Vec<Node> {
    let group = serde_json::json!({"id": "g1", "text": "Apartment 12", "parent": "#"});
    let children = meters.iter().map(|(id, text, title)| {
        serde_json::json!({"id": id, "text": text, "parent": "g1", "a_attr": {"title": title}})
    });
    std::iter::once(group)
        .chain(children)
        .map(serde_json::from_value)
        .collect::<Result<_, _>>()
        .expect("the fixture must be valid")
}

/// Full 48-hour series where each reading equals its index.
pub fn quick_graph(utility: &str) -> QuickGraph {
    #[allow(clippy::cast_precision_loss)]
    let data = (0..N_READINGS).map(|index| Some(index as f64)).collect();
    QuickGraph {
        utility: utility.to_owned(),
        name: Some(format!("Apartment 12 {utility}")),
        site: Some("Harbour View".to_owned()),
        data,
    }
}
