pub(crate) mod dom;
pub(crate) mod scroller;
