//! ID type wrappers for type safety.

mod id_macro;

pub mod binding_id;
pub mod device_id;
pub mod endpoint_id;
pub mod space_id;

pub use binding_id::{ActiveActivityId, BindingId};
pub use device_id::{ChannelId, DeviceId, PropertyId};
pub use endpoint_id::EndpointId;
pub use space_id::SpaceId;
