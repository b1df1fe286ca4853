//! Diffusion engine.
//!
//! Propagates content from a source along every one of its outgoing links,
//! recording one transmission per (content type, destination) pair and
//! delivering the value into the destination agent's content slot.

use chrono::Utc;
use rand::Rng;

use crate::network::{Network, NetworkError, NodeId, NodeRole, Transmission};

/// Send everything a source emits along each of its outgoing links.
///
/// For each content type (in emission order) and each outgoing link (in
/// creation order) one transmission is appended to the source's log and the
/// value is delivered into the destination agent's matching slot, where a
/// later delivery overwrites an earlier one. Returns the number of
/// transmissions produced; a source with no outgoing links is a no-op.
pub fn trigger_source<R: Rng + ?Sized>(
    net: &mut Network,
    source: NodeId,
    rng: &mut R,
) -> Result<usize, NetworkError> {
    let state = net
        .node(source)?
        .as_source()
        .ok_or(NetworkError::WrongRole {
            id: source,
            expected: NodeRole::Source,
        })?;
    let emissions = state.emissions.clone();

    let destinations: Vec<NodeId> = net
        .outgoing_links(source)
        .map(|link| link.destination)
        .collect();
    if destinations.is_empty() {
        log::debug!("{} has no outgoing links; nothing to transmit", source);
        return Ok(0);
    }

    let mut produced = 0;
    for emission in &emissions {
        for destination in &destinations {
            let value = emission.payload.generate(rng);

            let state = net.source_state_mut(source)?;
            let seq = state.take_seq();
            state.outgoing_transmissions.push(Transmission {
                source,
                destination: *destination,
                content_type: emission.content_type.clone(),
                value: value.clone(),
                seq,
                sent_at: Utc::now(),
            });

            net.agent_state_mut(*destination)?
                .update(&emission.content_type, value);
            produced += 1;
        }
    }

    log::debug!("Triggered {}: {} transmissions", source, produced);
    Ok(produced)
}

/// Transmission log of a source, in delivery order
pub fn transmissions(net: &Network, source: NodeId) -> Result<&[Transmission], NetworkError> {
    let state = net
        .node(source)?
        .as_source()
        .ok_or(NetworkError::WrongRole {
            id: source,
            expected: NodeRole::Source,
        })?;
    Ok(&state.outgoing_transmissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Emission, Payload};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_content_source() -> Vec<Emission> {
        vec![
            Emission::new("genome", Payload::RandomBinary { bits: 8 }),
            Emission::new("memome", Payload::RandomBinary { bits: 8 }),
        ]
    }

    #[test]
    fn test_trigger_fills_every_connected_slot() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut net = Network::new();
        let a = net.add_agent(&mut rng).unwrap();
        let b = net.add_agent(&mut rng).unwrap();
        let source = net.add_global_source(two_content_source()).unwrap();

        assert_eq!(net.content(a, "genome").unwrap(), None);
        assert_eq!(net.content(b, "memome").unwrap(), None);

        let produced = trigger_source(&mut net, source, &mut rng).unwrap();

        assert_eq!(produced, 4);
        assert_eq!(transmissions(&net, source).unwrap().len(), 4);
        for agent in [a, b] {
            assert!(net.content(agent, "genome").unwrap().is_some());
            assert!(net.content(agent, "memome").unwrap().is_some());
        }
    }

    #[test]
    fn test_trigger_without_links_is_a_noop() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut net = Network::new();
        let source = net.add_global_source(two_content_source()).unwrap();

        let produced = trigger_source(&mut net, source, &mut rng).unwrap();

        assert_eq!(produced, 0);
        assert!(transmissions(&net, source).unwrap().is_empty());
    }

    #[test]
    fn test_repeated_triggering_is_additive_on_the_log() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut net = Network::new();
        let a = net.add_agent(&mut rng).unwrap();
        let source = net
            .add_local_source(two_content_source(), a)
            .unwrap();

        trigger_source(&mut net, source, &mut rng).unwrap();
        trigger_source(&mut net, source, &mut rng).unwrap();

        let log = transmissions(&net, source).unwrap();
        assert_eq!(log.len(), 4);
        let seqs: Vec<u64> = log.iter().map(|tx| tx.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
        // Slot writes overwrite: the agent holds exactly one value per type.
        assert_eq!(
            net.node(a).unwrap().as_agent().unwrap().filled_slots(),
            2
        );
    }

    #[test]
    fn test_delivery_overwrites_previous_value() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut net = Network::new();
        let a = net.add_agent(&mut rng).unwrap();
        let first = net
            .add_local_source(
                vec![Emission::new(
                    "genome",
                    Payload::Fixed {
                        value: "0000".to_string(),
                    },
                )],
                a,
            )
            .unwrap();
        let second = net
            .add_local_source(
                vec![Emission::new(
                    "genome",
                    Payload::Fixed {
                        value: "1111".to_string(),
                    },
                )],
                a,
            )
            .unwrap();

        trigger_source(&mut net, first, &mut rng).unwrap();
        trigger_source(&mut net, second, &mut rng).unwrap();

        assert_eq!(net.content(a, "genome").unwrap(), Some("1111"));
    }

    #[test]
    fn test_trigger_rejects_agents() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut net = Network::new();
        let a = net.add_agent(&mut rng).unwrap();

        let err = trigger_source(&mut net, a, &mut rng).unwrap_err();
        assert!(matches!(err, NetworkError::WrongRole { .. }));
    }

    #[test]
    fn test_transmission_order_is_content_major_link_minor() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut net = Network::new();
        let a = net.add_agent(&mut rng).unwrap();
        let b = net.add_agent(&mut rng).unwrap();
        let source = net.add_global_source(two_content_source()).unwrap();

        trigger_source(&mut net, source, &mut rng).unwrap();

        let log = transmissions(&net, source).unwrap();
        let order: Vec<(&str, NodeId)> = log
            .iter()
            .map(|tx| (tx.content_type.as_str(), tx.destination))
            .collect();
        assert_eq!(
            order,
            vec![("genome", a), ("genome", b), ("memome", a), ("memome", b)]
        );
    }
}
