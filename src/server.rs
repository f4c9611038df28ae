//! The remote daemon as described by `RPL_MYINFO` (004).

use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub name: String,
    /// Daemon version string, e.g. `solanum-1.0-dev`.
    pub version: String,
    /// User modes the daemon advertises.
    pub user_modes: String,
    /// Channel modes the daemon advertises.
    pub channel_modes: String,
}

impl Server {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Snapshot for Server {
    const KIND: &'static str = "server";
}
