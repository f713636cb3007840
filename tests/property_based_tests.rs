mod common;

use std::future::Future;
use std::sync::Arc;

use common::*;
use proptest::prelude::*;
use vm_lifecycle::config::DispatchConfig;
use vm_lifecycle::{DispatchError, DispatchOutcome, Dispatcher, LifecycleCommand, RawLifecycleRequest};

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn command_strategy() -> impl Strategy<Value = LifecycleCommand> {
    prop_oneof![Just(LifecycleCommand::Start), Just(LifecycleCommand::Stop)]
}

/// Verbs that look plausible but are not exactly `start` or `stop`
fn unknown_command_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z_]{0,12}",
        Just("Start".to_string()),
        Just("STOP".to_string()),
        Just(" start".to_string()),
        Just("stop ".to_string()),
        Just("restart".to_string()),
    ]
    .prop_filter("known verbs", |s| s != "start" && s != "stop")
}

proptest! {
    /// Property: every listed instance receives exactly one call of the requested kind
    #[test]
    fn each_instance_called_exactly_once(command in command_strategy(), count in 0usize..24) {
        let resolver = MockResolver::new();
        let fleet = instance_fleet(count);
        let event = EventBuilder::new(command.as_str()).instances(&fleet).build();

        let outcome = block_on(Dispatcher::unbounded(Arc::new(resolver.clone())).handle_event(&event));

        prop_assert_eq!(
            outcome.unwrap(),
            DispatchOutcome::Completed {
                command,
                instance_count: count,
                message: command.success_message().to_string(),
            }
        );
        prop_assert_eq!(resolver.call_count(), count);
        for instance in &fleet {
            prop_assert_eq!(resolver.calls_for(command, instance), 1);
        }
    }

    /// Property: unrecognized commands never reach the provider
    #[test]
    fn unknown_commands_are_ignored(command in unknown_command_strategy(), count in 0usize..8) {
        let resolver = MockResolver::new();
        let event = EventBuilder::new(&command).instances(&instance_fleet(count)).build();

        let outcome = block_on(Dispatcher::unbounded(Arc::new(resolver.clone())).handle_event(&event));

        prop_assert_eq!(outcome.unwrap(), DispatchOutcome::Ignored { command });
        prop_assert_eq!(resolver.resolved_count(), 0);
        prop_assert_eq!(resolver.call_count(), 0);
    }

    /// Property: a non-string command is ignored whatever the rest of the payload holds
    #[test]
    fn non_string_commands_are_ignored(
        command in prop_oneof![
            any::<i64>().prop_map(serde_json::Value::from),
            any::<bool>().prop_map(serde_json::Value::from),
            Just(serde_json::json!(["start"])),
            Just(serde_json::json!({ "verb": "stop" })),
        ],
        with_instances in any::<bool>(),
    ) {
        let resolver = MockResolver::new();
        let mut body = serde_json::json!({ "command": command });
        if with_instances {
            body["instances"] = serde_json::json!(instance_fleet(3));
        }

        let outcome = block_on(
            Dispatcher::unbounded(Arc::new(resolver.clone())).handle_event(&event_with_body(&body.to_string())),
        );

        prop_assert_eq!(outcome.unwrap(), DispatchOutcome::Ignored { command: command.to_string() });
        prop_assert_eq!(resolver.resolved_count(), 0);
    }

    /// Property: any failing subset fails the batch, yet every instance was attempted
    #[test]
    fn any_failure_fails_whole_batch(
        command in command_strategy(),
        (count, failing) in (1usize..12).prop_flat_map(|n| {
            (Just(n), prop::collection::btree_set(0..n, 1..=n))
        }),
    ) {
        let fleet = instance_fleet(count);
        let mut resolver = MockResolver::new();
        for index in &failing {
            resolver = resolver.with_behavior(&fleet[*index].name, MockBehavior::RejectCall);
        }
        let event = EventBuilder::new(command.as_str()).instances(&fleet).build();

        let result = block_on(Dispatcher::unbounded(Arc::new(resolver.clone())).handle_event(&event));

        let is_lifecycle_failure = matches!(
            result,
            Err(DispatchError::LifecycleCall { command: c, .. }) if c == command
        );
        prop_assert!(is_lifecycle_failure);
        prop_assert_eq!(resolver.call_count(), count);
        prop_assert_eq!(resolver.waited_count(), count - failing.len());
    }

    /// Property: a configured bound is never exceeded
    #[test]
    fn bounded_fan_out_never_exceeds_limit(limit in 1usize..5, count in 0usize..16) {
        let resolver = MockResolver::new()
            .with_operation_delay(std::time::Duration::from_millis(1));
        let dispatcher = Dispatcher::new(
            Arc::new(resolver.clone()),
            DispatchConfig { max_concurrency: Some(limit) },
        );
        let event = EventBuilder::stop().instances(&instance_fleet(count)).build();

        block_on(dispatcher.handle_event(&event)).unwrap();

        prop_assert!(resolver.max_in_flight() <= limit);
        prop_assert_eq!(resolver.call_count(), count);
    }

    /// Property: decoding arbitrary event data never panics and only fails as malformed
    #[test]
    fn arbitrary_event_data_decodes_or_is_malformed(data in ".{0,64}") {
        if let Err(err) = RawLifecycleRequest::decode(&data) {
            let is_malformed = matches!(err, DispatchError::MalformedPayload { .. });
            prop_assert!(is_malformed, "unexpected error: {:?}", err);
        }
    }
}
