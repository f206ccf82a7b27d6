/// A failure checking one project during a scan. Contained at the
/// per-project boundary: logged, counted in the batch summary, never
/// propagated to the batch caller as a hard failure.
#[derive(Debug, thiserror::Error)]
#[error("detection failed for project {project_id} ({detector}): {reason}")]
pub struct DetectionError {
    pub project_id: String,
    pub detector: String,
    pub reason: String,
}
