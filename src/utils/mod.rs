pub mod debounce;
pub mod toggle;

pub use debounce::Debouncer;
pub use toggle::Toggle;
