use std::sync::Arc;
use uuid::Uuid;

use crate::application::errors::CommandError;
use crate::domain::order::Order;
use crate::ports::{GeoClient, UnitOfWorkFactory};
use crate::utils::CancellationToken;

#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// Becomes the order id
    pub basket_id: Uuid,
    pub street: String,
    pub volume: i32,
}

pub struct CreateOrderHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    geo: Arc<dyn GeoClient>,
}

impl CreateOrderHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>, geo: Arc<dyn GeoClient>) -> Self {
        Self { uow_factory, geo }
    }

    pub async fn handle(&self, command: CreateOrder, cancel: &CancellationToken) -> Result<Uuid, CommandError> {
        let location = self
            .geo
            .get_location(&command.street, cancel)
            .await
            .map_err(CommandError::Geo)?;
        let order = Order::create(command.basket_id, location, command.volume)?;

        let mut uow = self.uow_factory.begin().await?;
        uow.orders().add(order).await?;
        if !uow.save_changes(cancel).await? {
            return Err(CommandError::Cancelled);
        }

        tracing::info!(
            order_id = %command.basket_id,
            street = %command.street,
            %location,
            volume = command.volume,
            "📦 Order created"
        );
        Ok(command.basket_id)
    }
}
