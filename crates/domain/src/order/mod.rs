//! Sales order aggregate and related types.

mod commands;
mod model;
mod status;

pub use commands::{AddItem, CreateOrder, ItemSpec, UpdateOrder};
pub use model::{Order, OrderItem};
pub use status::OrderStatus;
