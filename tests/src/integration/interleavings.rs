//! # Randomised Interleavings
//!
//! Replies, duplicates, foreign traffic, cancellations and clock advances in
//! seeded random order, checked against a shadow model of the registry.

#[cfg(test)]
mod tests {
    use crate::integration::harness::Harness;
    use hmi_01_interface_state::CapabilityStore;
    use hmi_02_correlation::testing::{CallLog, EngineFixture, Outcome, ProbeCommand};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use serde_json::json;
    use shared_types::{
        CorrelationId, FunctionId, HmiInterface, HmiMessage, InterfaceState, ResultCode,
    };
    use std::collections::HashMap;
    use std::time::Duration;

    const SEEDS: u64 = 64;
    const STEPS: usize = 200;
    const ID_POOL: u32 = 6;
    const FUNCTIONS: [FunctionId; 2] = [FunctionId::UiIsReady, FunctionId::RcIsReady];

    struct ShadowCall {
        instance: usize,
        function_id: FunctionId,
        deadline: Duration,
    }

    /// What the registry should hold and what should have fired.
    #[derive(Default)]
    struct Shadow {
        now: Duration,
        instances: usize,
        pending: HashMap<u32, ShadowCall>,
        fired: Vec<(CorrelationId, Outcome)>,
    }

    impl Shadow {
        fn submit(&mut self, id: u32, function_id: FunctionId, timeout: Duration) {
            self.instances += 1;
            if self.pending.contains_key(&id) {
                return;
            }
            self.pending.insert(
                id,
                ShadowCall {
                    instance: self.instances,
                    function_id,
                    deadline: self.now + timeout,
                },
            );
        }

        fn reply(&mut self, id: u32, function_id: FunctionId) {
            if self
                .pending
                .get(&id)
                .is_some_and(|call| call.function_id == function_id)
            {
                self.pending.remove(&id);
                self.fired.push((CorrelationId::new(id), Outcome::Event));
            }
        }

        fn cancel(&mut self, id: u32) {
            self.pending.remove(&id);
        }

        fn advance(&mut self, by: Duration) {
            self.now += by;
            let mut due: Vec<(Duration, usize, u32)> = self
                .pending
                .iter()
                .filter(|(_, call)| call.deadline <= self.now)
                .map(|(id, call)| (call.deadline, call.instance, *id))
                .collect();
            due.sort();
            for (_, _, id) in due {
                self.pending.remove(&id);
                self.fired.push((CorrelationId::new(id), Outcome::Timeout));
            }
        }
    }

    fn run_seed(seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut f = EngineFixture::new();
        let log = CallLog::new();
        let mut shadow = Shadow::default();

        for step in 0..STEPS {
            let id = rng.gen_range(1..=ID_POOL);
            let function_id = *FUNCTIONS.choose(&mut rng).unwrap_or(&FUNCTIONS[0]);

            match rng.gen_range(0..10) {
                0..=3 => {
                    let timeout = Duration::from_millis(rng.gen_range(1..=2_000));
                    shadow.submit(id, function_id, timeout);
                    f.engine.submit(Box::new(
                        ProbeCommand::new(CorrelationId::new(id), function_id, &log)
                            .with_timeout(timeout),
                    ));
                }
                4..=6 => {
                    // Covers late, duplicate and foreign replies alike.
                    shadow.reply(id, function_id);
                    f.deliver(HmiMessage::response(
                        function_id,
                        CorrelationId::new(id),
                        json!({}),
                    ));
                }
                7 => {
                    shadow.cancel(id);
                    f.engine.handle().cancel(CorrelationId::new(id)).unwrap();
                    f.engine.drain();
                }
                _ => {
                    let by = Duration::from_millis(rng.gen_range(0..=700));
                    shadow.advance(by);
                    f.advance(by);
                }
            }

            assert_eq!(
                f.engine.registry().pending_count(),
                shadow.pending.len(),
                "seed {seed} step {step}"
            );
        }

        assert_eq!(log.all(), shadow.fired, "seed {seed}");

        let dropped = f.engine.shutdown();
        assert_eq!(dropped, shadow.pending.len(), "seed {seed}");

        assert!(
            log.terminal_by_instance().values().all(|count| *count == 1),
            "seed {seed}: a probe got two terminal callbacks"
        );
        let cleanups = log.cleanups_by_instance();
        assert_eq!(cleanups.len(), shadow.instances, "seed {seed}");
        assert!(
            cleanups.values().all(|count| *count == 1),
            "seed {seed}: a probe was cleaned up twice"
        );

        let stats = f.engine.registry().stats().snapshot();
        assert_eq!(
            stats.registered,
            stats.matched + stats.timeouts + stats.cancelled + stats.dropped,
            "seed {seed}"
        );
        assert_eq!(
            stats.matched + stats.timeouts,
            shadow.fired.len() as u64,
            "seed {seed}"
        );
    }

    #[test]
    fn test_random_interleavings_match_model() {
        for seed in 0..SEEDS {
            run_seed(seed);
        }
    }

    // =========================================================================
    // HANDSHAKE OUTCOMES
    // =========================================================================

    #[derive(Debug, Clone, Copy)]
    enum Answer {
        Available(bool),
        Absent,
        Error,
        Silent,
    }

    const ANSWERS: [Answer; 5] = [
        Answer::Available(true),
        Answer::Available(false),
        Answer::Absent,
        Answer::Error,
        Answer::Silent,
    ];

    #[test]
    fn test_random_handshake_outcomes() {
        for seed in 0..SEEDS {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut h = Harness::new();

            let mut plan: Vec<(u32, HmiInterface, Answer)> =
                HmiInterface::with_readiness_handshake()
                    .zip(1..)
                    .map(|(interface, id)| {
                        let answer = *ANSWERS.choose(&mut rng).unwrap_or(&Answer::Silent);
                        (id, interface, answer)
                    })
                    .collect();
            for (id, interface, _) in &plan {
                h.probe(*interface, *id, Duration::from_secs(5));
            }

            plan.shuffle(&mut rng);
            for (id, interface, answer) in &plan {
                let Some(function_id) = interface.is_ready_function() else {
                    continue;
                };
                let correlation_id = CorrelationId::new(*id);
                let message = match answer {
                    Answer::Available(available) => HmiMessage::response(
                        function_id,
                        correlation_id,
                        json!({ "available": available }),
                    ),
                    Answer::Absent => HmiMessage::response(function_id, correlation_id, json!({})),
                    Answer::Error => HmiMessage::error_response(
                        function_id,
                        correlation_id,
                        ResultCode::GenericError,
                    ),
                    Answer::Silent => continue,
                };
                h.engine.handle().deliver(message).unwrap();
                h.engine.drain();
                if rng.gen_bool(0.3) {
                    // A duplicate never reaches the handshake again.
                    h.reply(function_id, *id, json!({ "available": false }));
                }
            }
            h.advance(Duration::from_secs(5));

            for (_, interface, answer) in &plan {
                let expected_state = match answer {
                    Answer::Available(available) => InterfaceState::from_available(*available),
                    _ => InterfaceState::NotResponded,
                };
                assert_eq!(h.states.get_state(*interface), expected_state, "seed {seed} {interface}");
                assert_eq!(
                    h.capabilities.is_cooperating(*interface),
                    matches!(answer, Answer::Available(true)),
                    "seed {seed} {interface}"
                );

                let expected_requests = match answer {
                    Answer::Available(false) => 0,
                    _ => 1,
                };
                for function_id in interface.capability_requests() {
                    assert_eq!(
                        h.transport.count_for(*function_id),
                        expected_requests,
                        "seed {seed} {function_id}"
                    );
                }
            }
            // Capability requests raised by the timeouts above run out too.
            h.advance(Duration::from_secs(2));
            assert_eq!(h.engine.registry().pending_count(), 0, "seed {seed}");
        }
    }
}
