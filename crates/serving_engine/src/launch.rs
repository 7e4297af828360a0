use serving_core::{ArgumentInfo, Job, ResourceId};
use serving_logging::{serving_info, serving_warn};

use crate::api::JobCreate;
use crate::{LaunchError, ServingApi};

/// Creates a job for `model_id`. One attempt, no retry.
pub async fn launch(
    api: &dyn ServingApi,
    model_id: &ResourceId,
    argument_infos: &[ArgumentInfo],
) -> Result<Job, LaunchError> {
    let request = JobCreate {
        model_id: model_id.clone(),
        argument_infos: argument_infos.to_vec(),
    };
    let job = api.create_job(&request).await.map_err(|err| {
        serving_warn!("Creating job for model {} failed: {}", model_id, err);
        LaunchError(err)
    })?;
    serving_info!("Created job {} ({})", job.id, job.status);
    Ok(job)
}
