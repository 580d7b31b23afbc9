pub mod defaults;
pub mod service;

pub use defaults::propose_default;
pub use service::ActivityBindingService;
