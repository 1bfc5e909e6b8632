use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// Which sender origins a context accepts envelopes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OriginPolicy {
    /// Accept everything. Only reachable by configuring `"*"` explicitly.
    Any,
    Allow(BTreeSet<String>),
}

impl OriginPolicy {
    pub fn allow<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let origins: BTreeSet<String> = origins
            .into_iter()
            .map(|o| normalize(&o.into()))
            .collect();

        if origins.contains("*") {
            warn!("Origin policy allows any sender");
            return OriginPolicy::Any;
        }
        OriginPolicy::Allow(origins)
    }

    pub fn accepts(&self, origin: &str) -> bool {
        match self {
            OriginPolicy::Any => true,
            OriginPolicy::Allow(origins) => origins.contains(&normalize(origin)),
        }
    }
}

impl Default for OriginPolicy {
    /// Nothing is trusted until origins are configured
    fn default() -> Self {
        OriginPolicy::Allow(BTreeSet::new())
    }
}

fn normalize(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}
