use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::RouterError;

/// 路由策略
///
/// 前五种由策略选择器处理；`Broadcast` 绕过选择器，把任务发给所有Worker并做多数表决。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    #[default]
    RoundRobin,
    Random,
    LeastLoaded,
    ConsistentHash,
    PriorityBased,
    Broadcast,
}

impl RoutingStrategy {
    pub const ALL: [RoutingStrategy; 6] = [
        RoutingStrategy::RoundRobin,
        RoutingStrategy::Random,
        RoutingStrategy::LeastLoaded,
        RoutingStrategy::ConsistentHash,
        RoutingStrategy::PriorityBased,
        RoutingStrategy::Broadcast,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingStrategy::RoundRobin => "round_robin",
            RoutingStrategy::Random => "random",
            RoutingStrategy::LeastLoaded => "least_loaded",
            RoutingStrategy::ConsistentHash => "consistent_hash",
            RoutingStrategy::PriorityBased => "priority_based",
            RoutingStrategy::Broadcast => "broadcast",
        }
    }
}

impl fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutingStrategy {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        RoutingStrategy::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| RouterError::InvalidStrategy(s.to_string()))
    }
}
