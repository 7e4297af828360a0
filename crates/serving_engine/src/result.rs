use serving_logging::{serving_debug, serving_warn};

use crate::{ResultFetchError, ServingApi};

pub async fn fetch_result(api: &dyn ServingApi, path: &str) -> Result<String, ResultFetchError> {
    match api.get_result(path).await {
        Ok(text) => {
            serving_debug!("Result {} fetched ({} bytes)", path, text.len());
            Ok(text)
        }
        Err(err) => {
            serving_warn!("Fetching result {} failed: {}", path, err);
            Err(ResultFetchError(err))
        }
    }
}
