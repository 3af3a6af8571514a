//! 机械臂库的错误类型定义。

use std::fmt;

use thiserror::Error;

use crate::modules::types::{Direction, Joint, TransferPhase};

/// 与机械臂通信时可能发生的错误。
///
/// 未找到设备不是错误：[`crate::ArmSession::acquire`] 返回 `Ok(None)`。
#[derive(Debug, Error)]
pub enum ArmError {
    #[error("枚举 USB 设备失败: {0}")]
    Enumeration(#[source] rusb::Error),

    #[error("打开设备失败: {0}")]
    DeviceOpen(#[source] rusb::Error),

    #[error("关节 {joint} 不能向 {direction} 方向运动")]
    InvalidJointDirection { joint: Joint, direction: Direction },

    #[error("控制传输失败（{phase} 阶段）: {fault}")]
    TransferFailed {
        phase: TransferPhase,
        #[source]
        fault: TransferFault,
    },

    #[error("会话已释放")]
    Released,
}

impl ArmError {
    /// 是否为调用方的编程错误（而非瞬时 I/O 故障）。
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            ArmError::InvalidJointDirection { .. } | ArmError::Released
        )
    }

    /// 失败的传输阶段。
    pub fn transfer_phase(&self) -> Option<TransferPhase> {
        match self {
            ArmError::TransferFailed { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// 停止阶段失败后电机可能仍在转动。
    pub fn motor_may_be_running(&self) -> bool {
        self.transfer_phase() == Some(TransferPhase::Stop)
    }
}

/// 单次控制传输失败的原因。
#[derive(Debug)]
pub enum TransferFault {
    /// 设备确认的字节数不等于负载长度
    Short { transferred: usize, expected: usize },
    /// USB 层错误（包括超时）
    Usb(rusb::Error),
}

impl fmt::Display for TransferFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferFault::Short {
                transferred,
                expected,
            } => write!(f, "仅传输 {}/{} 字节", transferred, expected),
            TransferFault::Usb(e) => write!(f, "USB 错误: {}", e),
        }
    }
}

impl std::error::Error for TransferFault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferFault::Usb(e) => Some(e),
            TransferFault::Short { .. } => None,
        }
    }
}
