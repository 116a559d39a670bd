pub(crate) mod engine;
pub(crate) mod pin;
pub(crate) mod position;
pub(crate) mod proxy;
