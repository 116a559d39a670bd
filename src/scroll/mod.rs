pub(crate) mod bridge;
pub(crate) mod debounce;
pub(crate) mod readiness;
