use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,

    #[serde(rename = "rememberMe")]
    pub remember_me: bool,
}

/// Meter tree node as returned by the root nodes endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct Node {
    pub id: String,
    pub text: String,

    /// `#` for the top-level nodes.
    pub parent: String,

    #[serde(rename = "a_attr", default)]
    pub attributes: Option<NodeAttributes>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NodeAttributes {
    #[serde(default)]
    pub title: Option<String>,
}

/// Single series from the quick graphs endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct QuickGraph {
    /// Utility name, optionally followed by a parenthetical: `Electricity (Main Meter)`.
    pub utility: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub site: Option<String>,

    pub data: Vec<Option<f64>>,
}
