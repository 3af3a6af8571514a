//! 机械臂演示程序
//!
//! 运行方式：
//! ```bash
//! cargo run --features logging
//! ```
//!
//! 依次执行：底座左转 500 ms、打开 LED、肩部前倾 1500 ms、张开夹爪。
//! 按 Ctrl+C 会在当前步骤完成（电机已停止）后退出。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use robot_arm::{scan_devices, ArmError, ArmSession, Direction, Joint, RusbTransport};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    #[cfg(feature = "logging")]
    env_logger::init();

    // 扫描设备
    println!("Scanning for USB devices...");
    let devices = scan_devices();
    println!("Found {} devices:", devices.len());
    for (i, info) in devices.iter().enumerate() {
        println!("  [{}] {} {}", i, info, if info.is_arm() { "<-- Robotic arm" } else { "" });
    }

    let arm = match ArmSession::acquire() {
        Ok(Some(arm)) => arm,
        Ok(None) => {
            println!("\nRobotic arm not found! (VID=0x1267, PID=0x0000)");
            println!("Please connect the arm via USB.");
            return Ok(());
        }
        Err(e) => {
            println!("Failed to open the arm: {}", e);
            println!("\nNote: on Linux you may need a udev rule granting access to 1267:0000.");
            return Ok(());
        }
    };

    println!("Connected!");

    let running = Arc::new(AtomicBool::new(true));

    #[cfg(feature = "ctrlc")]
    {
        let running_clone = running.clone();
        ctrlc::set_handler(move || {
            running_clone.store(false, Ordering::SeqCst);
        })?;
    }

    let result = run_demo(&arm, &running).await;
    arm.release().await;
    println!("Released!");

    if let Err(e) = &result {
        if e.motor_may_be_running() {
            eprintln!("Stop command was not acknowledged, unplug the arm!");
        }
    }
    result.map_err(Into::into)
}

async fn run_demo(arm: &ArmSession<RusbTransport>, running: &AtomicBool) -> Result<(), ArmError> {
    if !running.load(Ordering::SeqCst) {
        return Ok(());
    }
    println!("Base left for 500 ms...");
    arm.move_joint(Joint::Base, Direction::Left, 500).await?;

    if !running.load(Ordering::SeqCst) {
        return Ok(());
    }
    println!("LED on...");
    arm.switch_led(true).await?;

    if !running.load(Ordering::SeqCst) {
        return Ok(());
    }
    println!("Shoulder forwards for 1500 ms...");
    arm.move_joint(Joint::Shoulder, Direction::Forwards, 1500).await?;

    if !running.load(Ordering::SeqCst) {
        return Ok(());
    }
    println!("Gripper open...");
    arm.open_close_gripper(true).await
}
