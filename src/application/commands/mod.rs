pub mod assign_orders;
pub mod create_courier;
pub mod create_order;
pub mod move_couriers;

pub use assign_orders::*;
pub use create_courier::*;
pub use create_order::*;
pub use move_couriers::*;
