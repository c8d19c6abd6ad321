//! Concurrent version updates for compose services

use futures::future::join_all;
use tracing::{debug, error, info};

use crate::compose::service::Service;
use crate::version::error::UpdateError;
use crate::version::registry::Registry;
use crate::version::selector::{TagDenylist, select_latest};

/// Resolve the latest matching version of a single service
///
/// Ignored services are left untouched. On success the selected image is
/// stored as the service's latest image.
async fn update_service(
    service: &mut Service,
    registry: &dyn Registry,
    denylist: &TagDenylist,
) -> Result<(), UpdateError> {
    if service.options().ignore {
        info!("Skipping {}: ignored by annotation", service.name());
        return Ok(());
    }

    let mode = service.update_mode();
    let image_name = service.current().normalized_name();
    debug!(
        "Looking up tags for {} ({}, {:?})",
        service.name(),
        image_name,
        mode
    );

    let tags = registry.fetch_tag_names(&image_name).await?;
    let latest = select_latest(service.current(), &tags, mode, denylist)?;

    if latest.is_same_version(service.current()) {
        debug!("{} is up to date at {}", service.name(), latest);
    } else {
        info!("{}: {} => {}", service.name(), service.current(), latest);
    }
    service.set_latest(latest);

    Ok(())
}

/// Update all services concurrently
///
/// Every service is looked up independently; a failing service does not stop
/// the others. Once all lookups have finished, the first error in service
/// order is returned. Services that were resolved keep their result.
pub async fn update_services(
    services: &mut [Service],
    registry: &dyn Registry,
    denylist: &TagDenylist,
) -> Result<(), UpdateError> {
    let futures = services.iter_mut().map(|service| async move {
        let result = update_service(service, registry, denylist).await;
        if let Err(e) = &result {
            error!("Failed to update {}: {}", service.name(), e);
        }
        result
    });

    join_all(futures).await.into_iter().collect()
}
