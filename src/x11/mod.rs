mod window_class;

pub use window_class::{WindowClassError, WindowClassResolver, XpropResolver};
