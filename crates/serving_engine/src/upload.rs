use serving_core::{ArgumentInfo, StagedValue};
use serving_logging::{serving_info, serving_warn};

use crate::{ServingApi, UploadError};

/// Sends every staged value in one multipart request and returns the
/// server's argument descriptors verbatim. One attempt, no retry.
pub async fn upload(
    api: &dyn ServingApi,
    values: &[StagedValue],
) -> Result<Vec<ArgumentInfo>, UploadError> {
    match api.upload_values(values).await {
        Ok(response) => {
            serving_info!(
                "Uploaded {} value(s); server returned {} argument(s)",
                values.len(),
                response.argument_infos.len()
            );
            Ok(response.argument_infos)
        }
        Err(err) => {
            serving_warn!("Upload of {} value(s) failed: {}", values.len(), err);
            Err(UploadError(err))
        }
    }
}
