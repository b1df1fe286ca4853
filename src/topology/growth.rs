//! Preferential-attachment growth.
//!
//! This file implements the scale-free growth step: a newcomer selects `m`
//! distinct existing agents, weighted by their current agent-to-agent
//! outdegree, and realizes each connection as a reciprocal link pair.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::network::{Network, NetworkError, NodeId};

/// Run one growth step: create a new agent and attach it to `m` distinct
/// existing agents picked by preferential attachment.
///
/// The step is atomic: any failure discards the newcomer and every link
/// staged for it, leaving the network exactly as it was.
pub(crate) fn preferential_step<R: Rng + ?Sized>(
    net: &mut Network,
    m: usize,
    rng: &mut R,
) -> Result<NodeId, NetworkError> {
    let available = net.agent_count();
    if m > available {
        return Err(NetworkError::InsufficientPopulation {
            requested: m,
            available,
        });
    }

    let mark = net.mark();
    let newcomer = net.push_agent();
    match attach_preferentially(net, newcomer, m, rng) {
        Ok(()) => {
            log::debug!(
                "Growth step attached {} to {} existing agents ({} links total)",
                newcomer,
                m,
                net.link_count()
            );
            Ok(newcomer)
        }
        Err(err) => {
            net.rollback_to(mark);
            Err(err)
        }
    }
}

fn attach_preferentially<R: Rng + ?Sized>(
    net: &mut Network,
    newcomer: NodeId,
    m: usize,
    rng: &mut R,
) -> Result<(), NetworkError> {
    let mut picked: Vec<NodeId> = Vec::with_capacity(m);

    for pick in 0..m {
        // Weights are recomputed from the live link set after each pick;
        // the newcomer and already-picked targets are never candidates.
        let mut candidates: Vec<(NodeId, usize)> = Vec::new();
        for agent in net.agents() {
            if *agent == newcomer || picked.contains(agent) {
                continue;
            }
            candidates.push((*agent, net.outdegree(*agent)?));
        }
        if candidates.is_empty() {
            return Err(NetworkError::InsufficientPopulation {
                requested: m,
                available: pick,
            });
        }

        let target = match candidates.choose_weighted(rng, |(_, weight)| *weight) {
            Ok((id, _)) => *id,
            Err(_) => {
                // Degenerate weights (all outdegrees zero): uniform
                // selection without replacement.
                log::warn!(
                    "All candidate outdegrees are zero; picking uniformly for {}",
                    newcomer
                );
                candidates[rng.gen_range(0..candidates.len())].0
            }
        };

        picked.push(target);
        net.connect(newcomer, target)?;
        net.connect(target, newcomer)?;
    }

    Ok(())
}
