//! USB 玩具机械臂控制库。
//!
//! 机械臂有四个关节、一个夹爪和一个 LED，只接受 3 字节的厂商控制传输
//! `[动作字节1, 动作字节2, LED 字节]`。关节运动是开环的：先发送动作码，
//! 等待指定时长，再发送停止码。设备不记忆 LED 状态，所以每次传输都携带它。
//!
//! ```no_run
//! use robot_arm::{ArmSession, Direction, Joint};
//!
//! # async fn demo() -> Result<(), robot_arm::ArmError> {
//! if let Some(arm) = ArmSession::acquire()? {
//!     arm.move_joint(Joint::Base, Direction::Left, 500).await?;
//!     arm.switch_led(true).await?;
//!     arm.open_close_gripper(true).await?;
//!     arm.release().await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod modules;

pub use modules::command::{encode_gripper, encode_led, encode_motion, payload};
pub use modules::config::ArmConfig;
pub use modules::constants::{USB_PID, USB_VID};
pub use modules::error::{ArmError, TransferFault};
pub use modules::session::ArmSession;
pub use modules::types::{ControlSetup, DeviceInfo, Direction, Joint, MotionCode, TransferPhase};
pub use modules::usb::{
    scan_devices, BlockingControl, BlockingTransport, ControlTransport, DeviceFinder, RusbControl,
    RusbFinder, RusbTransport,
};
