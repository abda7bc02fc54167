// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::RwLock;

/// Sampling rates keyed by `service:<name>,env:<env>`, as returned by the agent.
pub type RateByService = HashMap<String, f64>;

/// Key the agent uses for the rate applied to services it has not seen yet.
pub const DEFAULT_KEY: &str = "service:,env:";

/// Receives agent feedback and adjusts future sampling decisions.
pub trait PrioritySampler: Send + Sync {
    /// Replaces the known rates. Calling it twice with the same map has no further effect.
    fn update(&self, rates: RateByService);
}

/// Keeps the latest rate map reported by the agent.
#[derive(Debug, Default)]
pub struct RateByServiceSampler {
    rates: RwLock<RateByService>,
}

impl RateByServiceSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rate for the given service and environment, falling back to the agent default and
    /// then to keeping everything.
    pub fn rate(&self, service: &str, env: &str) -> f64 {
        let rates = match self.rates.read() {
            Ok(rates) => rates,
            Err(poisoned) => poisoned.into_inner(),
        };
        let key = format!("service:{service},env:{env}");

        rates
            .get(&key)
            .or_else(|| rates.get(DEFAULT_KEY))
            .copied()
            .unwrap_or(1.0)
    }
}

impl PrioritySampler for RateByServiceSampler {
    fn update(&self, rates: RateByService) {
        let rates = rates
            .into_iter()
            .map(|(key, rate)| (key, rate.clamp(0.0, 1.0)))
            .collect();

        match self.rates.write() {
            Ok(mut current) => *current = rates,
            Err(poisoned) => *poisoned.into_inner() = rates,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_keeping_everything() {
        let sampler = RateByServiceSampler::new();

        assert_eq!(sampler.rate("api", "prod"), 1.0);
    }

    #[test]
    fn uses_service_rate_then_agent_default() {
        let sampler = RateByServiceSampler::new();

        sampler.update(HashMap::from([
            ("service:api,env:prod".to_string(), 0.25),
            (DEFAULT_KEY.to_string(), 0.5),
        ]));

        assert_eq!(sampler.rate("api", "prod"), 0.25);
        assert_eq!(sampler.rate("db", "prod"), 0.5);
    }

    #[test]
    fn last_update_wins() {
        let sampler = RateByServiceSampler::new();

        sampler.update(HashMap::from([("service:api,env:prod".to_string(), 0.25)]));
        sampler.update(HashMap::from([("service:api,env:prod".to_string(), 0.75)]));
        sampler.update(HashMap::from([("service:api,env:prod".to_string(), 0.75)]));

        assert_eq!(sampler.rate("api", "prod"), 0.75);
    }

    #[test]
    fn clamps_out_of_range_rates() {
        let sampler = RateByServiceSampler::new();

        sampler.update(HashMap::from([
            ("service:api,env:prod".to_string(), 3.0),
            ("service:db,env:prod".to_string(), -1.0),
        ]));

        assert_eq!(sampler.rate("api", "prod"), 1.0);
        assert_eq!(sampler.rate("db", "prod"), 0.0);
    }
}
