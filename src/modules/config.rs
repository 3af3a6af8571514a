//! 会话的运行时配置。

use std::time::Duration;

use crate::modules::constants::{
    GRIPPER_DELAY_MS, STOP_RETRIES, STOP_RETRY_INTERVAL_MS, TIMEOUT_MS,
};

/// 会话配置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmConfig {
    /// 夹爪动作时长，与调用方无关。
    pub gripper_duration: Duration,
    /// 单次控制传输超时（仅 rusb 后端使用）。
    pub transfer_timeout: Duration,
    /// 停止传输失败后的额外重试次数，0 表示不重试。
    ///
    /// 如果操作在重试间隔中被取消，`Drop` 还会再补发一次停止，
    /// 所以停止负载最多会发送 `stop_retries + 2` 次。停止负载是幂等的。
    pub stop_retries: u32,
    /// 停止重试之间的间隔。
    pub stop_retry_interval: Duration,
}

impl ArmConfig {
    /// 默认配置。
    pub fn new() -> Self {
        Self {
            gripper_duration: Duration::from_millis(GRIPPER_DELAY_MS),
            transfer_timeout: Duration::from_millis(TIMEOUT_MS),
            stop_retries: STOP_RETRIES,
            stop_retry_interval: Duration::from_millis(STOP_RETRY_INTERVAL_MS),
        }
    }

    pub fn with_gripper_duration(mut self, duration: Duration) -> Self {
        self.gripper_duration = duration;
        self
    }

    pub fn with_transfer_timeout(mut self, timeout: Duration) -> Self {
        self.transfer_timeout = timeout;
        self
    }

    pub fn with_stop_retries(mut self, retries: u32) -> Self {
        self.stop_retries = retries;
        self
    }

    pub fn with_stop_retry_interval(mut self, interval: Duration) -> Self {
        self.stop_retry_interval = interval;
        self
    }
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self::new()
    }
}
