//! 机械臂库的公共类型定义。

use std::fmt;

use crate::modules::constants::{CONTROL_INDEX, CONTROL_REQUEST, CONTROL_VALUE, USB_PID, USB_VID};

/// 机械臂的四个关节。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    /// 底座（左右旋转）
    Base,
    /// 肩部
    Shoulder,
    /// 肘部
    Elbow,
    /// 腕部
    Wrist,
}

impl Joint {
    /// 所有关节。
    pub const ALL: [Joint; 4] = [Joint::Base, Joint::Shoulder, Joint::Elbow, Joint::Wrist];

    /// 该关节允许的两个方向。
    pub fn directions(&self) -> [Direction; 2] {
        match self {
            Joint::Base => [Direction::Left, Direction::Right],
            _ => [Direction::Forwards, Direction::Backwards],
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Joint::Base => "base",
            Joint::Shoulder => "shoulder",
            Joint::Elbow => "elbow",
            Joint::Wrist => "wrist",
        };
        f.write_str(name)
    }
}

/// 运动方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Forwards,
    Backwards,
}

impl Direction {
    /// 所有方向。
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Forwards,
        Direction::Backwards,
    ];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Forwards => "forwards",
            Direction::Backwards => "backwards",
        };
        f.write_str(name)
    }
}

/// 两字节的电机动作码。
///
/// 每个字节是只有一位置位的位掩码，两个字节都为零表示停止。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotionCode {
    pub byte1: u8,
    pub byte2: u8,
}

impl MotionCode {
    /// 停止所有电机。
    pub const STOP: MotionCode = MotionCode::new(0x00, 0x00);

    /// 创建新的动作码。
    pub const fn new(byte1: u8, byte2: u8) -> Self {
        Self { byte1, byte2 }
    }

    /// 是否为停止码。
    pub fn is_stop(&self) -> bool {
        *self == Self::STOP
    }
}

/// 一次操作中的传输阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    /// 启动电机的传输
    Start,
    /// 停止电机的传输
    Stop,
    /// 切换 LED 的单次传输
    Led,
}

impl fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferPhase::Start => "start",
            TransferPhase::Stop => "stop",
            TransferPhase::Led => "led",
        };
        f.write_str(name)
    }
}

/// 控制传输的 setup 包字段（wLength 由负载长度决定）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSetup {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
}

impl ControlSetup {
    /// 机械臂唯一使用的 setup：厂商类、主机到设备、接收者为设备。
    pub fn arm_command() -> Self {
        Self {
            request_type: rusb::request_type(
                rusb::Direction::Out,
                rusb::RequestType::Vendor,
                rusb::Recipient::Device,
            ),
            request: CONTROL_REQUEST,
            value: CONTROL_VALUE,
            index: CONTROL_INDEX,
        }
    }
}

/// 设备信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// 厂商 ID。
    pub vid: u16,
    /// 产品 ID。
    pub pid: u16,
    /// 总线号。
    pub bus: u8,
    /// 设备地址。
    pub address: u8,
}

impl DeviceInfo {
    /// 是否为机械臂。
    pub fn is_arm(&self) -> bool {
        self.vid == USB_VID && self.pid == USB_PID
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} (bus {:03}, addr {:03})",
            self.vid, self.pid, self.bus, self.address
        )
    }
}
