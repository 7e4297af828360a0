use serving_core::{Job, Model, PollerState, SessionViewModel};

/// Status lines for the current session, one concern per line.
pub fn render(view: &SessionViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(match &view.model {
        Some(model) => format!("model: {} (id {})", model.name, model.id),
        None => format!("model: {} (not resolved)", view.model_name),
    });

    let staged = view
        .staged
        .iter()
        .map(|row| format!("[{}] {} {}", row.index, row.kind, row.label))
        .collect::<Vec<_>>();
    lines.push(format!("staged: {}", join_or_none(&staged)));

    let arguments = if view.uploading {
        "uploading...".to_string()
    } else {
        let infos = view
            .argument_infos
            .iter()
            .map(|info| format!("[{}] {} {}", info.index, info.kind, info.value))
            .collect::<Vec<_>>();
        join_or_none(&infos)
    };
    lines.push(format!("arguments: {arguments}"));

    if let Some(job) = &view.job {
        let poller = match view.poller {
            PollerState::Idle => "",
            PollerState::Polling => ", polling",
            PollerState::Stopped => ", stopped",
        };
        lines.push(format!("{}{}", job_summary(job), poller));
    }

    if let Some(error) = &view.last_error {
        lines.push(format!("error: {error}"));
    }

    lines
}

/// Lines of `next` that are new or differ from the same position in `prev`.
pub fn changed_lines<'a>(prev: &[String], next: &'a [String]) -> Vec<&'a str> {
    next.iter()
        .enumerate()
        .filter(|(index, line)| prev.get(*index) != Some(*line))
        .map(|(_, line)| line.as_str())
        .collect()
}

pub fn job_summary(job: &Job) -> String {
    let mut summary = format!("job {}: {}", job.id, job.status);
    if let Some(progress) = &job.progress {
        summary.push_str(&format!(" (progress {progress})"));
    }
    summary
}

pub fn render_job(job: &Job) -> Vec<String> {
    let mut lines = vec![job_summary(job)];
    if let Some(created_at) = &job.created_at {
        lines.push(format!("  created: {created_at}"));
    }
    if let Some(updated_at) = &job.updated_at {
        lines.push(format!("  updated: {updated_at}"));
    }
    if let Some(path) = job.result_ref() {
        lines.push(format!("  result: {path}"));
    }
    if let Some(log) = &job.failed_log {
        lines.push(format!("  failure: {log}"));
    }
    lines
}

pub fn render_jobs(jobs: &[Job]) -> Vec<String> {
    if jobs.is_empty() {
        return vec!["no jobs".to_string()];
    }
    jobs.iter()
        .map(|job| match job.result_ref() {
            Some(path) => format!("{} -> {}", job_summary(job), path),
            None => job_summary(job),
        })
        .collect()
}

pub fn render_models(models: &[Model]) -> Vec<String> {
    if models.is_empty() {
        return vec!["no models".to_string()];
    }
    models
        .iter()
        .map(|model| format!("{}\t{}", model.id, model.name))
        .collect()
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
