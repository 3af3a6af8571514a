//! 机械臂库的常量定义。

/// 机械臂的 USB 厂商 ID。
pub const USB_VID: u16 = 0x1267;

/// 机械臂的 USB 产品 ID。
pub const USB_PID: u16 = 0x0000;

/// 控制传输超时时间（毫秒）。
pub const TIMEOUT_MS: u64 = 1000;

/// 控制传输的 bRequest。
pub const CONTROL_REQUEST: u8 = 6;

/// 控制传输的 wValue。
pub const CONTROL_VALUE: u16 = 0x0100;

/// 控制传输的 wIndex。
pub const CONTROL_INDEX: u16 = 0;

/// 每次控制传输的负载长度：[动作字节1, 动作字节2, LED 字节]。
pub const PAYLOAD_LEN: usize = 3;

/// 夹爪动作的固定时长（毫秒）。
pub const GRIPPER_DELAY_MS: u64 = 1000;

/// 停止阶段的默认重试次数。
pub const STOP_RETRIES: u32 = 2;

/// 停止重试之间的间隔（毫秒）。
pub const STOP_RETRY_INTERVAL_MS: u64 = 20;

/// 需要分离内核驱动并声明的接口号。
pub const INTERFACE: u8 = 0;
