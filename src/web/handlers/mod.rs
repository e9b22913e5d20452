//! Web 路由处理器

pub mod api;
pub mod pages;
pub mod proxy;

pub use api::*;
pub use pages::*;
pub use proxy::*;
