use std::sync::Once;

use pretty_assertions::assert_eq;
use serving_core::{
    update, ArgumentInfo, ArgumentType, Effect, Job, JobStatus, Model, Msg, PollerState, Progress,
    ResourceId, SessionError, SessionState,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(serving_logging::initialize_for_tests);
}

fn job(id: &str, status: JobStatus) -> Job {
    Job {
        id: id.into(),
        status,
        created_at: None,
        updated_at: None,
        progress: None,
        result_path: None,
        failed_log: None,
    }
}

fn with_result(mut job: Job, path: &str) -> Job {
    job.result_path = Some(path.to_string());
    job
}

fn ready_session() -> SessionState {
    let state = SessionState::new("mnist");
    let (state, _) = update(
        state,
        Msg::ModelsLoaded(vec![Model {
            id: "m1".into(),
            name: "mnist".to_string(),
            created_at: None,
            updated_at: None,
        }]),
    );
    let (state, _) = update(state, Msg::TextStaged("hello".to_string()));
    let (state, _) = update(state, Msg::UploadRequested);
    let (state, _) = update(
        state,
        Msg::UploadCompleted(Ok(vec![ArgumentInfo {
            index: 0,
            kind: ArgumentType::Text,
            value: "hello".to_string(),
        }])),
    );
    state
}

fn launched(state: SessionState, id: &str) -> (SessionState, Vec<Effect>) {
    update(state, Msg::JobLaunched(Ok(job(id, JobStatus::Pending))))
}

fn polled(state: SessionState, generation: u64, job: Job) -> (SessionState, Vec<Effect>) {
    let job_id = job.id.clone();
    update(
        state,
        Msg::JobPolled {
            generation,
            job_id,
            result: Ok(job),
        },
    )
}

#[test]
fn launch_without_model_sends_nothing() {
    init_logging();
    let state = SessionState::new("mnist");
    let (state, _) = update(state, Msg::TextStaged("hello".to_string()));
    let (state, _) = update(state, Msg::UploadRequested);
    let (state, _) = update(
        state,
        Msg::UploadCompleted(Ok(vec![ArgumentInfo {
            index: 0,
            kind: ArgumentType::Text,
            value: "hello".to_string(),
        }])),
    );

    let (state, effects) = update(state, Msg::LaunchRequested);
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.job, None);
    assert_eq!(view.poller, PollerState::Idle);
    assert_eq!(view.last_error, None);
}

#[test]
fn launch_without_arguments_sends_nothing() {
    init_logging();
    let (state, _) = update(
        SessionState::new("mnist"),
        Msg::ModelsLoaded(vec![Model {
            id: ResourceId::Int(3),
            name: "mnist".to_string(),
            created_at: None,
            updated_at: None,
        }]),
    );
    let (_, effects) = update(state, Msg::LaunchRequested);
    assert!(effects.is_empty());
}

#[test]
fn launch_sends_model_id_and_arguments() {
    init_logging();
    let (_, effects) = update(ready_session(), Msg::LaunchRequested);
    assert_eq!(
        effects,
        vec![Effect::Launch {
            model_id: "m1".into(),
            argument_infos: vec![ArgumentInfo {
                index: 0,
                kind: ArgumentType::Text,
                value: "hello".to_string(),
            }],
        }]
    );
}

#[test]
fn launched_job_starts_polling() {
    init_logging();
    let (state, effects) = launched(ready_session(), "j1");
    assert_eq!(effects, vec![Effect::StartPolling { generation: 1 }]);
    let view = state.view();
    assert_eq!(view.poller, PollerState::Polling);
    assert_eq!(view.job.map(|job| job.id), Some("j1".into()));
}

#[test]
fn failed_launch_is_surfaced_and_starts_nothing() {
    init_logging();
    let (state, effects) = update(
        ready_session(),
        Msg::JobLaunched(Err("http status 500".to_string())),
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.poller, PollerState::Idle);
    assert_eq!(
        view.last_error,
        Some(SessionError::Launch("http status 500".to_string()))
    );
}

#[test]
fn tick_fetches_until_terminal_then_stops_without_fetch() {
    init_logging();
    let (state, _) = launched(ready_session(), "j1");

    let (state, effects) = update(state, Msg::PollTick { generation: 1 });
    assert_eq!(
        effects,
        vec![Effect::FetchJob {
            generation: 1,
            job_id: "j1".into()
        }]
    );
    let (state, effects) = polled(state, 1, job("j1", JobStatus::Failed));
    assert!(effects.is_empty());
    assert_eq!(state.view().poller, PollerState::Polling);

    let (state, effects) = update(state, Msg::PollTick { generation: 1 });
    assert_eq!(effects, vec![Effect::StopPolling { generation: 1 }]);
    assert_eq!(state.view().poller, PollerState::Stopped);

    // Late ticks from the cancelled timer never fetch.
    let (state, effects) = update(state, Msg::PollTick { generation: 1 });
    assert!(effects.is_empty());
    assert!(state.view().job_settled());
}

#[test]
fn poll_failure_keeps_loop_alive() {
    init_logging();
    let (state, _) = launched(ready_session(), "j1");
    let (state, _) = update(state, Msg::PollTick { generation: 1 });
    let (state, effects) = update(
        state,
        Msg::JobPolled {
            generation: 1,
            job_id: "j1".into(),
            result: Err("timeout".to_string()),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.job.as_ref().map(|job| job.status), Some(JobStatus::Pending));
    assert_eq!(view.last_error, None);

    let (_, effects) = update(state, Msg::PollTick { generation: 1 });
    assert_eq!(
        effects,
        vec![Effect::FetchJob {
            generation: 1,
            job_id: "j1".into()
        }]
    );
}

#[test]
fn snapshot_replaces_job_wholesale() {
    init_logging();
    let (state, _) = launched(ready_session(), "j1");
    let (state, _) = update(state, Msg::PollTick { generation: 1 });
    let mut running = job("j1", JobStatus::Running);
    running.progress = Some(Progress::Text("3/10".to_string()));
    running.created_at = Some("2024-01-01T00:00:00".to_string());
    let (state, _) = polled(state, 1, running);

    let (state, _) = update(state, Msg::PollTick { generation: 1 });
    let (state, _) = polled(state, 1, job("j1", JobStatus::Running));

    let held = state.view().job.unwrap();
    assert_eq!(held.progress, None);
    assert_eq!(held.created_at, None);
}

#[test]
fn second_launch_cancels_previous_timer_first() {
    init_logging();
    let (state, _) = launched(ready_session(), "j1");
    let (state, _) = update(state, Msg::PollTick { generation: 1 });

    let (state, effects) = launched(state, "j2");
    assert_eq!(
        effects,
        vec![
            Effect::StopPolling { generation: 1 },
            Effect::StartPolling { generation: 2 },
        ]
    );

    // The in-flight fetch of the first job resolves late and is dropped.
    let (state, effects) = polled(state, 1, job("j1", JobStatus::Completed));
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.job.as_ref().map(|job| job.id.clone()), Some("j2".into()));
    assert_eq!(view.job.map(|job| job.status), Some(JobStatus::Pending));

    // So are ticks from the first timer.
    let (_, effects) = update(state, Msg::PollTick { generation: 1 });
    assert!(effects.is_empty());
}

#[test]
fn result_from_late_fetch_after_stop_is_ignored() {
    init_logging();
    let (state, _) = launched(ready_session(), "j1");
    let (state, _) = update(state, Msg::PollTick { generation: 1 });
    let (state, effects) = update(state, Msg::StopRequested);
    assert_eq!(effects, vec![Effect::StopPolling { generation: 1 }]);

    let (state, effects) = polled(state, 1, job("j1", JobStatus::Running));
    assert!(effects.is_empty());
    assert_eq!(
        state.view().job.map(|job| job.status),
        Some(JobStatus::Pending)
    );
}

#[test]
fn terminal_snapshot_is_never_overwritten() {
    init_logging();
    let (state, _) = launched(ready_session(), "j1");
    let (state, _) = update(state, Msg::PollTick { generation: 1 });
    let (state, _) = polled(state, 1, job("j1", JobStatus::Completed));

    // A misbehaving server reports the job running again.
    let (state, _) = polled(state, 1, job("j1", JobStatus::Running));
    assert_eq!(
        state.view().job.map(|job| job.status),
        Some(JobStatus::Completed)
    );
}

#[test]
fn result_path_is_fetched_once() {
    init_logging();
    let (state, _) = launched(ready_session(), "j1");
    let (state, _) = update(state, Msg::PollTick { generation: 1 });
    let (state, effects) = polled(
        state,
        1,
        with_result(job("j1", JobStatus::Postprocessing), "r1"),
    );
    assert_eq!(
        effects,
        vec![Effect::FetchResult {
            path: "r1".to_string()
        }]
    );

    // Same path again while the fetch is still running.
    let (state, _) = update(state, Msg::PollTick { generation: 1 });
    let (state, effects) = polled(state, 1, with_result(job("j1", JobStatus::Completed), "r1"));
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::ResultFetched {
            path: "r1".to_string(),
            result: Ok("42".to_string()),
        },
    );
    assert_eq!(state.view().result.as_deref(), Some("42"));
}

#[test]
fn cached_result_is_reused_by_a_later_job() {
    init_logging();
    let (state, _) = launched(ready_session(), "j1");
    let (state, _) = update(state, Msg::PollTick { generation: 1 });
    let (state, _) = polled(state, 1, with_result(job("j1", JobStatus::Completed), "r1"));
    let (state, _) = update(
        state,
        Msg::ResultFetched {
            path: "r1".to_string(),
            result: Ok("42".to_string()),
        },
    );

    let (state, _) = launched(state, "j2");
    assert_eq!(state.view().result, None);
    let (state, _) = update(state, Msg::PollTick { generation: 2 });
    let (state, effects) = polled(state, 2, with_result(job("j2", JobStatus::Completed), "r1"));
    assert!(effects.is_empty());
    assert_eq!(state.view().result.as_deref(), Some("42"));
}

#[test]
fn failed_result_fetch_keeps_previous_result() {
    init_logging();
    let (state, _) = launched(ready_session(), "j1");
    let (state, _) = update(state, Msg::PollTick { generation: 1 });
    let (state, _) = polled(state, 1, with_result(job("j1", JobStatus::Inferenced), "r1"));
    let (state, _) = update(
        state,
        Msg::ResultFetched {
            path: "r1".to_string(),
            result: Ok("partial".to_string()),
        },
    );

    // The server moves the result to a new path, and fetching it fails.
    let (state, _) = update(state, Msg::PollTick { generation: 1 });
    let (state, effects) = polled(state, 1, with_result(job("j1", JobStatus::Running), "r2"));
    assert_eq!(
        effects,
        vec![Effect::FetchResult {
            path: "r2".to_string()
        }]
    );
    let (state, effects) = update(
        state,
        Msg::ResultFetched {
            path: "r2".to_string(),
            result: Err("network error".to_string()),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.result.as_deref(), Some("partial"));
    assert_eq!(
        view.last_error,
        Some(SessionError::ResultFetch("network error".to_string()))
    );

    // No automatic refetch on the next snapshot.
    let (state, _) = update(state, Msg::PollTick { generation: 1 });
    let (state, effects) = polled(state, 1, with_result(job("j1", JobStatus::Completed), "r2"));
    assert!(effects.is_empty());

    let (_, effects) = update(state, Msg::ResultRetryRequested);
    assert_eq!(
        effects,
        vec![Effect::FetchResult {
            path: "r2".to_string()
        }]
    );
}

#[test]
fn snapshot_with_differently_typed_id_keeps_polling_to_completion() {
    init_logging();
    let (state, _) = update(
        ready_session(),
        Msg::JobLaunched(Ok(Job {
            id: ResourceId::Int(5),
            ..job("5", JobStatus::Pending)
        })),
    );

    // The server echoes the id back as a string.
    let (state, effects) = update(state, Msg::PollTick { generation: 1 });
    assert_eq!(
        effects,
        vec![Effect::FetchJob {
            generation: 1,
            job_id: ResourceId::Int(5),
        }]
    );
    let (state, _) = update(
        state,
        Msg::JobPolled {
            generation: 1,
            job_id: ResourceId::Int(5),
            result: Ok(job("5", JobStatus::Running)),
        },
    );

    let (state, effects) = update(state, Msg::PollTick { generation: 1 });
    assert_eq!(
        effects,
        vec![Effect::FetchJob {
            generation: 1,
            job_id: ResourceId::Int(5),
        }]
    );
    let (state, _) = update(
        state,
        Msg::JobPolled {
            generation: 1,
            job_id: ResourceId::Int(5),
            result: Ok(job("5", JobStatus::Completed)),
        },
    );
    assert_eq!(
        state.view().job.map(|job| job.status),
        Some(JobStatus::Completed)
    );

    let (state, effects) = update(state, Msg::PollTick { generation: 1 });
    assert_eq!(effects, vec![Effect::StopPolling { generation: 1 }]);
    assert_eq!(state.view().poller, PollerState::Stopped);
}

#[test]
fn rejected_poll_result_does_not_block_later_ticks() {
    init_logging();
    let (state, _) = launched(ready_session(), "j1");
    let (state, _) = update(state, Msg::PollTick { generation: 1 });

    // A result tagged with another job id is discarded but still settles the fetch.
    let (state, effects) = polled(state, 1, job("other", JobStatus::Completed));
    assert!(effects.is_empty());

    let (_, effects) = update(state, Msg::PollTick { generation: 1 });
    assert_eq!(
        effects,
        vec![Effect::FetchJob {
            generation: 1,
            job_id: "j1".into(),
        }]
    );
}

#[test]
fn late_result_failure_from_earlier_job_is_not_reported() {
    init_logging();
    let (state, _) = launched(ready_session(), "j1");
    let (state, _) = update(state, Msg::PollTick { generation: 1 });
    let (state, _) = polled(state, 1, with_result(job("j1", JobStatus::Completed), "r1"));

    let (state, _) = launched(state, "j2");
    let (state, effects) = update(
        state,
        Msg::ResultFetched {
            path: "r1".to_string(),
            result: Err("boom".to_string()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().last_error, None);
    assert_eq!(state.view().job.map(|job| job.id), Some("j2".into()));
}
