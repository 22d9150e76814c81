//! # Scopa 双机对战核心逻辑库
//!
//! 这个 `core` crate 包含了 Scopa 的牌面定义、吃牌搜索、结算规则、
//! 对局状态机，以及两台设备之间互相同步镜像状态的消息协议。
//! 它不依赖任何具体的网络传输或界面，
//! 两端各自持有一份 `Session`，本地操作产出消息，对端消息原样装入。

mod card;
mod error;
mod logic;
mod message;
pub mod mirror;
mod resolver;
mod scoring;
mod session;
mod state;

pub use card::*;

pub use error::*;

pub use logic::*;

pub use message::*;

pub use resolver::*;

pub use scoring::*;

pub use session::*;

pub use state::*;
