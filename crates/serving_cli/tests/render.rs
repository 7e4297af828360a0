use pretty_assertions::assert_eq;
use serving_cli::render::{changed_lines, render, render_job, render_jobs, render_models};
use serving_core::{
    ArgumentInfo, ArgumentType, Job, JobStatus, Model, PollerState, Progress, ResourceId,
    SessionError, SessionViewModel, StagedRowView,
};

fn job(status: JobStatus) -> Job {
    Job {
        id: ResourceId::Int(5),
        status,
        created_at: None,
        updated_at: None,
        progress: None,
        result_path: None,
        failed_log: None,
    }
}

fn session() -> SessionViewModel {
    SessionViewModel {
        model_name: "mnist".to_string(),
        model: None,
        staged: Vec::new(),
        argument_infos: Vec::new(),
        uploading: false,
        job: None,
        poller: PollerState::Idle,
        result: None,
        last_error: None,
        dirty: false,
    }
}

#[test]
fn fresh_session_shows_unresolved_model() {
    assert_eq!(
        render(&session()),
        vec![
            "model: mnist (not resolved)",
            "staged: none",
            "arguments: none",
        ]
    );
}

#[test]
fn running_session_shows_every_stage() {
    let mut view = session();
    view.model = Some(Model {
        id: ResourceId::Int(1),
        name: "mnist".to_string(),
        created_at: None,
        updated_at: None,
    });
    view.staged = vec![
        StagedRowView {
            index: 0,
            kind: ArgumentType::Text,
            label: "hello".to_string(),
        },
        StagedRowView {
            index: 1,
            kind: ArgumentType::File,
            label: "digit.png".to_string(),
        },
    ];
    view.argument_infos = vec![ArgumentInfo {
        index: 0,
        kind: ArgumentType::Text,
        value: "hello".to_string(),
    }];
    let mut running = job(JobStatus::Running);
    running.progress = Some(Progress::Fraction(0.5));
    view.job = Some(running);
    view.poller = PollerState::Polling;
    view.last_error = Some(SessionError::ResultFetch("timed out".to_string()));

    assert_eq!(
        render(&view),
        vec![
            "model: mnist (id 1)",
            "staged: [0] text hello, [1] file digit.png",
            "arguments: [0] text hello",
            "job 5: running (progress 0.5), polling",
            "error: result fetch failed: timed out",
        ]
    );
}

#[test]
fn upload_in_flight_hides_old_arguments() {
    let mut view = session();
    view.uploading = true;
    assert_eq!(render(&view)[2], "arguments: uploading...");
}

#[test]
fn only_changed_lines_are_reported() {
    let prev = vec!["a".to_string(), "b".to_string()];
    let next = vec!["a".to_string(), "c".to_string(), "d".to_string()];
    assert_eq!(changed_lines(&prev, &next), vec!["c", "d"]);
    assert!(changed_lines(&next, &next).is_empty());
}

#[test]
fn failed_job_detail_includes_log() {
    let mut failed = job(JobStatus::Failed);
    failed.created_at = Some("2024-05-01T10:00:00".to_string());
    failed.failed_log = Some("model crashed".to_string());
    assert_eq!(
        render_job(&failed),
        vec![
            "job 5: failed",
            "  created: 2024-05-01T10:00:00",
            "  failure: model crashed",
        ]
    );
}

#[test]
fn job_listing_shows_result_paths() {
    let mut done = job(JobStatus::Completed);
    done.result_path = Some("results/5.txt".to_string());
    assert_eq!(
        render_jobs(&[done, job(JobStatus::Pending)]),
        vec!["job 5: completed -> results/5.txt", "job 5: pending"]
    );
    assert_eq!(render_jobs(&[]), vec!["no jobs"]);
}

#[test]
fn model_listing_is_tab_separated() {
    let models = vec![Model {
        id: ResourceId::Str("m1".to_string()),
        name: "mnist".to_string(),
        created_at: None,
        updated_at: None,
    }];
    assert_eq!(render_models(&models), vec!["m1\tmnist"]);
}
