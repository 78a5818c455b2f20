//! 鉴权模块：口令摘要、token 编解码与接口处理。

pub(crate) mod handlers;
pub(crate) mod password;
pub(crate) mod token;
