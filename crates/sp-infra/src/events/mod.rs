mod broadcast_bus;

pub use broadcast_bus::BroadcastMediaEventBus;
