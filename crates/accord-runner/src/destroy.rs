use accord_domain::{LifecycleState, StateSnapshot};
use accord_driver::RemoteClient;
use tracing::{debug, info};

use crate::error::DestroyError;

/// Confirm every root-module instance of `resource_type` in `snapshot` is gone.
///
/// An instance is gone when the remote answers 404, or still answers with a
/// state in `deleted`. Instances are checked one at a time and the first
/// failure is returned. Returns the number of instances checked.
pub async fn verify_destroyed(
    remote: &dyn RemoteClient,
    snapshot: &StateSnapshot,
    resource_type: &str,
    deleted: &[LifecycleState],
) -> Result<usize, DestroyError> {
    let mut checked = 0;

    for instance in snapshot.of_type(resource_type).filter(|i| i.module.is_none()) {
        checked += 1;
        match remote.get_lifecycle_state(&instance.id).await {
            Ok(state) if state.is_in(deleted) => {
                debug!(id = %instance.id, %state, "resource in deleted lifecycle state");
            }
            Ok(state) => {
                return Err(DestroyError::StillPresent {
                    id: instance.id.clone(),
                    state,
                });
            }
            Err(e) if e.is_not_found() => {
                debug!(id = %instance.id, "resource not found");
            }
            Err(e) => {
                return Err(DestroyError::Remote {
                    id: instance.id.clone(),
                    source: e,
                });
            }
        }
    }

    if checked == 0 {
        return Err(DestroyError::NoResourceFound {
            resource_type: resource_type.to_string(),
        });
    }
    info!(resource_type, checked, client = remote.name(), "destroy verified");
    Ok(checked)
}
