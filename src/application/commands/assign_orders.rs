use std::sync::Arc;
use uuid::Uuid;

use crate::application::errors::CommandError;
use crate::domain::services::DispatchService;
use crate::domain::DomainError;
use crate::ports::UnitOfWorkFactory;
use crate::utils::CancellationToken;

// ============================================================================
// Dispatch Cycle
// ============================================================================
//
// Matches the oldest Created order with the nearest free courier. "Nothing to
// do" outcomes are normal results; only storage and unexpected domain
// failures are errors.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Assigned { order_id: Uuid, courier_id: Uuid },
    NoCreatedOrder,
    NoFreeCourier,
    NoAvailableCourier { order_id: Uuid },
    Cancelled,
}

impl DispatchOutcome {
    pub fn is_assigned(&self) -> bool {
        matches!(self, DispatchOutcome::Assigned { .. })
    }
}

pub struct AssignOrdersHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    dispatch: DispatchService,
}

impl AssignOrdersHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory, dispatch: DispatchService::new() }
    }

    pub async fn handle(&self, cancel: &CancellationToken) -> Result<DispatchOutcome, CommandError> {
        if cancel.is_cancelled() {
            return Ok(DispatchOutcome::Cancelled);
        }

        let mut uow = self.uow_factory.begin().await?;

        let Some(mut order) = uow.orders().get_first_in_created_status().await? else {
            return Ok(DispatchOutcome::NoCreatedOrder);
        };

        let mut couriers = uow.couriers().get_all_free().await?;
        if couriers.is_empty() {
            tracing::debug!(order_id = %order.id(), "No free couriers for pending order");
            return Ok(DispatchOutcome::NoFreeCourier);
        }

        let index = match self.dispatch.dispatch(&mut order, &mut couriers) {
            Ok(index) => index,
            Err(DomainError::NoAvailableCourier) => {
                tracing::debug!(order_id = %order.id(), volume = order.volume(), "No courier can carry order");
                return Ok(DispatchOutcome::NoAvailableCourier { order_id: order.id() });
            }
            Err(e) => return Err(e.into()),
        };

        if cancel.is_cancelled() {
            return Ok(DispatchOutcome::Cancelled);
        }

        let courier = couriers.swap_remove(index);
        let (order_id, courier_id) = (order.id(), courier.id());

        uow.couriers().update(courier).await?;
        uow.orders().update(order).await?;
        if !uow.save_changes(cancel).await? {
            return Ok(DispatchOutcome::Cancelled);
        }

        tracing::info!(order_id = %order_id, courier_id = %courier_id, "🎯 Order assigned to courier");
        Ok(DispatchOutcome::Assigned { order_id, courier_id })
    }
}
