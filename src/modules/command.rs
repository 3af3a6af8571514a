//! 机械臂命令编码。
//!
//! 第一个字节：
//!   腕部前 0x04 / 后 0x08，肘部前 0x10 / 后 0x20，肩部前 0x40 / 后 0x80，
//!   夹爪闭合 0x01 / 张开 0x02。
//! 第二个字节：底座右转 0x01 / 左转 0x02。
//! 第三个字节：LED 开 0x01 / 关 0x00。

use crate::modules::constants::PAYLOAD_LEN;
use crate::modules::error::ArmError;
use crate::modules::types::{Direction, Joint, MotionCode};

/// 把关节和方向编码为动作码，非法组合返回 [`ArmError::InvalidJointDirection`]。
pub fn encode_motion(joint: Joint, direction: Direction) -> Result<MotionCode, ArmError> {
    let code = match (joint, direction) {
        (Joint::Base, Direction::Right) => MotionCode::new(0x00, 0x01),
        (Joint::Base, Direction::Left) => MotionCode::new(0x00, 0x02),
        (Joint::Shoulder, Direction::Forwards) => MotionCode::new(0x40, 0x00),
        (Joint::Shoulder, Direction::Backwards) => MotionCode::new(0x80, 0x00),
        (Joint::Elbow, Direction::Forwards) => MotionCode::new(0x10, 0x00),
        (Joint::Elbow, Direction::Backwards) => MotionCode::new(0x20, 0x00),
        (Joint::Wrist, Direction::Forwards) => MotionCode::new(0x04, 0x00),
        (Joint::Wrist, Direction::Backwards) => MotionCode::new(0x08, 0x00),
        _ => return Err(ArmError::InvalidJointDirection { joint, direction }),
    };
    Ok(code)
}

/// LED 字节。
pub fn encode_led(on: bool) -> u8 {
    if on {
        0x01
    } else {
        0x00
    }
}

/// 夹爪动作码。
pub fn encode_gripper(open: bool) -> MotionCode {
    if open {
        MotionCode::new(0x02, 0x00)
    } else {
        MotionCode::new(0x01, 0x00)
    }
}

/// 组装 3 字节控制负载。
pub fn payload(code: MotionCode, led_on: bool) -> [u8; PAYLOAD_LEN] {
    [code.byte1, code.byte2, encode_led(led_on)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_motion_table() {
        let expected = [
            (Joint::Base, Direction::Right, (0x00, 0x01)),
            (Joint::Base, Direction::Left, (0x00, 0x02)),
            (Joint::Shoulder, Direction::Forwards, (0x40, 0x00)),
            (Joint::Shoulder, Direction::Backwards, (0x80, 0x00)),
            (Joint::Elbow, Direction::Forwards, (0x10, 0x00)),
            (Joint::Elbow, Direction::Backwards, (0x20, 0x00)),
            (Joint::Wrist, Direction::Forwards, (0x04, 0x00)),
            (Joint::Wrist, Direction::Backwards, (0x08, 0x00)),
        ];

        for (joint, direction, (b1, b2)) in expected {
            let code = encode_motion(joint, direction).unwrap();
            assert_eq!(code, MotionCode::new(b1, b2), "{} {}", joint, direction);
        }
    }

    #[test]
    fn test_encode_motion_rejects_other_pairs() {
        let mut valid = 0;
        let mut invalid = 0;

        for joint in Joint::ALL {
            for direction in Direction::ALL {
                match encode_motion(joint, direction) {
                    Ok(code) => {
                        assert!(joint.directions().contains(&direction));
                        // 恰好一位置位
                        assert_eq!((code.byte1 | code.byte2).count_ones(), 1);
                        valid += 1;
                    }
                    Err(ArmError::InvalidJointDirection { joint: j, direction: d }) => {
                        assert_eq!((j, d), (joint, direction));
                        assert!(!joint.directions().contains(&direction));
                        invalid += 1;
                    }
                    Err(e) => panic!("unexpected error: {}", e),
                }
            }
        }

        assert_eq!(valid, 8);
        assert_eq!(invalid, 8);
    }

    #[test]
    fn test_encode_led() {
        assert_eq!(encode_led(true), 0x01);
        assert_eq!(encode_led(false), 0x00);
    }

    #[test]
    fn test_encode_gripper() {
        assert_eq!(encode_gripper(true), MotionCode::new(0x02, 0x00));
        assert_eq!(encode_gripper(false), MotionCode::new(0x01, 0x00));
    }

    #[test]
    fn test_payload_layout() {
        assert_eq!(payload(MotionCode::new(0x40, 0x00), true), [0x40, 0x00, 0x01]);
        assert_eq!(payload(MotionCode::STOP, false), [0x00, 0x00, 0x00]);
    }
}
