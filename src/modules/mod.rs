//! 机械臂库的模块声明。

// 常量
pub mod constants;

// 错误类型
pub mod error;

// 公共类型
pub mod types;

// 命令编码
pub mod command;

// 运行时配置
pub mod config;

// USB 底层操作
pub mod usb;

// 会话与两阶段传输
pub mod session;
