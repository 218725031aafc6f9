use std::sync::Arc;
use uuid::Uuid;

use crate::application::errors::CommandError;
use crate::domain::courier::Courier;
use crate::domain::shared_kernel::{Location, RandomSource};
use crate::ports::UnitOfWorkFactory;
use crate::utils::CancellationToken;

#[derive(Debug, Clone)]
pub struct CreateCourier {
    pub name: String,
    pub speed: i32,
}

/// Registers a courier at a random grid location
pub struct CreateCourierHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    random: Arc<dyn RandomSource>,
}

impl CreateCourierHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>, random: Arc<dyn RandomSource>) -> Self {
        Self { uow_factory, random }
    }

    pub async fn handle(&self, command: CreateCourier, cancel: &CancellationToken) -> Result<Uuid, CommandError> {
        let location = Location::create_random(self.random.as_ref());
        let courier = Courier::create(&command.name, command.speed, location)?;
        let courier_id = courier.id();

        let mut uow = self.uow_factory.begin().await?;
        uow.couriers().add(courier).await?;
        if !uow.save_changes(cancel).await? {
            return Err(CommandError::Cancelled);
        }

        tracing::info!(
            courier_id = %courier_id,
            name = %command.name,
            speed = command.speed,
            %location,
            "🚴 Courier created"
        );
        Ok(courier_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared_kernel::random::testing::SequenceRandom;
    use crate::domain::DomainError;
    use crate::infrastructure::MemoryStore;

    #[tokio::test]
    async fn test_creates_free_courier_at_random_location() {
        let store = MemoryStore::new();
        let handler = CreateCourierHandler::new(Arc::new(store.clone()), Arc::new(SequenceRandom::new(vec![3, 8])));

        let id = handler
            .handle(CreateCourier { name: "Ivan".into(), speed: 2 }, &CancellationToken::none())
            .await
            .unwrap();

        let mut uow = store.begin().await.unwrap();
        let courier = uow.couriers().get(id).await.unwrap().unwrap();
        assert_eq!(courier.location(), Location::create(3, 8).unwrap());
        assert!(courier.is_free());
    }

    #[tokio::test]
    async fn test_invalid_speed_is_rejected() {
        let handler = CreateCourierHandler::new(Arc::new(MemoryStore::new()), Arc::new(SequenceRandom::new(vec![1])));

        let result = handler
            .handle(CreateCourier { name: "Ivan".into(), speed: 0 }, &CancellationToken::none())
            .await;
        assert!(matches!(result, Err(CommandError::Domain(DomainError::InvalidValue("speed")))));
    }
}
