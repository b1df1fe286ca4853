//! Topology builders.
//!
//! Each builder constructs the initial set of agents and links for one
//! canonical topology and attaches the growth rule that keeps the shape's
//! generative invariant when agents are added later.

use crate::network::{Network, NetworkError};

use super::types::GrowthRule;

/// Build a linear chain of `size` agents.
///
/// Creates one directed link from agent[i] to agent[i+1] for each adjacent
/// pair, `size - 1` links in total (none for sizes 0 and 1).
pub fn build_chain(size: usize) -> Result<Network, NetworkError> {
    let mut net = Network::with_rule(GrowthRule::Chain);
    for _ in 0..size {
        net.push_agent();
    }
    let agents = net.agents().to_vec();
    for pair in agents.windows(2) {
        net.connect(pair[0], pair[1])?;
    }
    log::info!(
        "Built Chain topology: {} agents, {} links",
        net.agent_count(),
        net.link_count()
    );
    Ok(net)
}

/// Build a fully connected network of `size` agents.
///
/// Creates one directed link for every ordered pair of distinct agents,
/// `size * (size - 1)` links in total.
pub fn build_fully_connected(size: usize) -> Result<Network, NetworkError> {
    let mut net = Network::with_rule(GrowthRule::FullyConnected);
    for _ in 0..size {
        net.push_agent();
    }
    fully_connect(&mut net)?;
    log::info!(
        "Built FullyConnected topology: {} agents, {} links",
        net.agent_count(),
        net.link_count()
    );
    Ok(net)
}

/// Build the seed of a scale-free network: a fully connected network of
/// `m0` agents whose later growth picks `m` existing agents per newcomer
/// by preferential attachment.
pub fn build_scale_free(m0: usize, m: usize) -> Result<Network, NetworkError> {
    let mut net = Network::with_rule(GrowthRule::ScaleFree { m });
    for _ in 0..m0 {
        net.push_agent();
    }
    fully_connect(&mut net)?;
    log::info!(
        "Built ScaleFree seed: {} agents, {} links (m = {})",
        net.agent_count(),
        net.link_count(),
        m
    );
    Ok(net)
}

/// Wire every ordered pair of distinct agents
fn fully_connect(net: &mut Network) -> Result<(), NetworkError> {
    let agents = net.agents().to_vec();
    for origin in &agents {
        for destination in &agents {
            if origin != destination {
                net.connect(*origin, *destination)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_chain_shape() {
        let net = build_chain(4).unwrap();
        assert_eq!(net.agent_count(), 4);
        assert_eq!(net.link_count(), 3);

        let first = net.first_agent().unwrap();
        let last = net.last_agent().unwrap();
        assert_eq!(net.indegree(first).unwrap(), 0);
        assert_eq!(net.outdegree(first).unwrap(), 1);
        assert_eq!(net.indegree(last).unwrap(), 1);
        assert_eq!(net.outdegree(last).unwrap(), 0);
        assert_eq!(net.to_string(), "<Chain with 4 agents, 0 sources, 3 links>");
    }

    #[test]
    fn test_empty_chain_reports_absence() {
        let net = build_chain(0).unwrap();
        assert!(net.first_agent().is_none());
        assert!(net.last_agent().is_none());
        assert_eq!(net.link_count(), 0);
    }

    #[test]
    fn test_single_agent_chain() {
        let net = build_chain(1).unwrap();
        assert_eq!(net.agent_count(), 1);
        assert_eq!(net.link_count(), 0);
        assert_eq!(net.first_agent(), net.last_agent());
    }

    #[test]
    fn test_chain_grows_by_appending() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut net = build_chain(3).unwrap();
        let old_last = net.last_agent().unwrap();

        let newcomer = net.add_agent(&mut rng).unwrap();

        assert_eq!(net.agent_count(), 4);
        assert_eq!(net.link_count(), 4);
        assert_eq!(net.last_agent(), Some(newcomer));
        assert_eq!(net.outdegree(old_last).unwrap(), 1);
        assert_eq!(net.indegree(newcomer).unwrap(), 1);
    }

    #[test]
    fn test_fully_connected_shape() {
        let net = build_fully_connected(4).unwrap();
        assert_eq!(net.agent_count(), 4);
        assert_eq!(net.link_count(), 12);
        assert_eq!(net.get_degrees(), vec![3, 3, 3, 3]);
        assert_eq!(
            net.to_string(),
            "<FullyConnected with 4 agents, 0 sources, 12 links>"
        );
    }

    #[test]
    fn test_fully_connected_growth_rewires_completely() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut net = build_fully_connected(3).unwrap();
        net.add_agent(&mut rng).unwrap();

        assert_eq!(net.agent_count(), 4);
        assert_eq!(net.link_count(), 12);
        assert_eq!(net.get_degrees(), vec![3, 3, 3, 3]);
    }

    #[test]
    fn test_scale_free_seed_and_growth() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut net = build_scale_free(4, 4).unwrap();
        assert_eq!(net.agent_count(), 4);
        assert_eq!(net.link_count(), 12);
        assert_eq!(net.growth_rule(), &GrowthRule::ScaleFree { m: 4 });

        net.add_agent(&mut rng).unwrap();
        assert_eq!(net.agent_count(), 5);
        assert_eq!(net.link_count(), 20);

        net.add_agent(&mut rng).unwrap();
        assert_eq!(net.agent_count(), 6);
        assert_eq!(net.link_count(), 28);
        assert_eq!(
            net.to_string(),
            "<ScaleFree with 6 agents, 0 sources, 28 links>"
        );
    }

    #[test]
    fn test_scale_free_growth_rejects_oversized_m() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut net = build_scale_free(2, 4).unwrap();

        let err = net.add_agent(&mut rng).unwrap_err();

        assert!(matches!(err, NetworkError::InsufficientPopulation { .. }));
        assert_eq!(net.agent_count(), 2);
        assert_eq!(net.link_count(), 2);
    }

    #[test]
    fn test_scale_free_trivial_seed_uses_uniform_fallback() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut net = build_scale_free(1, 1).unwrap();
        assert_eq!(net.link_count(), 0);

        net.add_agent(&mut rng).unwrap();

        assert_eq!(net.agent_count(), 2);
        assert_eq!(net.link_count(), 2);
    }
}
