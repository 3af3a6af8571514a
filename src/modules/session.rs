//! 机械臂会话：持有设备句柄和 LED 状态，执行两阶段定时传输。

use std::time::Duration;

use tokio::sync::Mutex;

use crate::modules::command::{encode_gripper, encode_motion, payload};
use crate::modules::config::ArmConfig;
use crate::modules::constants::{PAYLOAD_LEN, USB_PID, USB_VID};
use crate::modules::error::{ArmError, TransferFault};
use crate::modules::types::{ControlSetup, Direction, Joint, MotionCode, TransferPhase};
use crate::modules::usb::{ControlTransport, DeviceFinder, RusbFinder, RusbTransport};

/// 会话内部状态，整个操作期间都在锁内。
struct SessionState<T> {
    /// `None` 表示已释放。
    transport: Option<T>,
    /// 设备不记忆 LED 状态，每次传输都要重新发送。
    led_on: bool,
}

/// 与一台机械臂的会话。
///
/// 同一会话上的操作按调用顺序串行执行：每个操作在发送停止传输之前都持有内部锁。
/// 释放后所有操作返回 [`ArmError::Released`]，不会触碰设备。
pub struct ArmSession<T: ControlTransport> {
    state: Mutex<SessionState<T>>,
    config: ArmConfig,
}

impl ArmSession<RusbTransport> {
    /// 查找并打开第一台机械臂，没有设备时返回 `Ok(None)`。
    ///
    /// 某些平台会弹出 USB 权限确认，需要在能够响应它的上下文中调用。
    pub fn acquire() -> Result<Option<Self>, ArmError> {
        Self::acquire_with_config(ArmConfig::default())
    }

    /// 使用指定配置查找并打开机械臂。
    pub fn acquire_with_config(config: ArmConfig) -> Result<Option<Self>, ArmError> {
        let finder = RusbFinder::with_timeout(config.transfer_timeout)?;
        Self::acquire_with(&finder, config)
    }
}

impl<T: ControlTransport> ArmSession<T> {
    /// 用任意发现后端获取会话。多台设备时只打开第一台。
    pub fn acquire_with<F>(finder: &F, config: ArmConfig) -> Result<Option<Self>, ArmError>
    where
        F: DeviceFinder<Transport = T>,
    {
        let candidates = finder.find(USB_VID, USB_PID)?;

        let Some(first) = candidates.first() else {
            #[cfg(feature = "logging")]
            log::info!("No robotic arm found (VID={:04x}, PID={:04x})", USB_VID, USB_PID);
            return Ok(None);
        };

        #[cfg(feature = "logging")]
        {
            if candidates.len() > 1 {
                log::info!("{} robotic arms connected, using the first one", candidates.len());
            }
        }

        let transport = finder.open(first)?;
        Ok(Some(Self::new(transport, config)))
    }

    /// 包装已打开的传输。
    pub fn new(transport: T, config: ArmConfig) -> Self {
        Self {
            state: Mutex::new(SessionState {
                transport: Some(transport),
                led_on: false,
            }),
            config,
        }
    }

    /// 当前配置。
    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    /// 记录的 LED 状态（调用方请求的状态，不是设备确认的状态）。
    pub async fn led_on(&self) -> bool {
        self.state.lock().await.led_on
    }

    /// 会话是否已释放。
    pub async fn is_released(&self) -> bool {
        self.state.lock().await.transport.is_none()
    }

    /// 让关节朝指定方向运动 `duration_ms` 毫秒，负数按 0 处理。
    pub async fn move_joint(
        &self,
        joint: Joint,
        direction: Direction,
        duration_ms: i64,
    ) -> Result<(), ArmError> {
        let duration_ms = if duration_ms < 0 {
            #[cfg(feature = "logging")]
            log::warn!("Negative move duration {} ms clamped to 0", duration_ms);
            0
        } else {
            duration_ms as u64
        };

        let code = encode_motion(joint, direction)?;

        #[cfg(feature = "logging")]
        log::info!("Move {} {} for {} ms", joint, direction, duration_ms);

        self.actuate(code, Duration::from_millis(duration_ms)).await
    }

    /// 张开（`true`）或闭合（`false`）夹爪，时长固定。
    pub async fn open_close_gripper(&self, open: bool) -> Result<(), ArmError> {
        #[cfg(feature = "logging")]
        log::info!("Gripper: {}", if open { "open" } else { "close" });

        self.actuate(encode_gripper(open), self.config.gripper_duration)
            .await
    }

    /// 开关 LED。
    ///
    /// 即使传输失败，记录的 LED 状态也会更新为请求值，后续传输都会携带它。
    pub async fn switch_led(&self, on: bool) -> Result<(), ArmError> {
        let mut state = self.state.lock().await;
        if state.transport.is_none() {
            return Err(ArmError::Released);
        }
        state.led_on = on;

        #[cfg(feature = "logging")]
        log::info!("LED: {}", if on { "on" } else { "off" });

        let transport = state.transport.as_mut().ok_or(ArmError::Released)?;
        transfer(transport, payload(MotionCode::STOP, on), TransferPhase::Led).await
    }

    /// 释放设备句柄。重复调用无副作用。
    pub async fn release(&self) {
        let mut state = self.state.lock().await;
        if let Some(transport) = state.transport.take() {
            drop(transport);
            #[cfg(feature = "logging")]
            log::info!("Robotic arm released");
        }
    }

    /// 两阶段传输：启动、等待、停止。
    async fn actuate(&self, code: MotionCode, duration: Duration) -> Result<(), ArmError> {
        let mut state = self.state.lock().await;
        let led_on = state.led_on;
        let transport = state.transport.as_mut().ok_or(ArmError::Released)?;

        // 启动传输发出后被取消时无法知道电机是否已经转动，所以此时就要保证会发停止
        let mut pending = PendingStop {
            transport,
            payload: payload(MotionCode::STOP, led_on),
            armed: true,
        };

        if let Err(e) = pending.send(payload(code, led_on), TransferPhase::Start).await {
            // 启动失败时电机没有动，直接返回
            pending.armed = false;
            return Err(e);
        }

        tokio::time::sleep(duration).await;

        let stop = pending.payload;
        let mut attempt = 0;
        loop {
            match pending.send(stop, TransferPhase::Stop).await {
                Ok(()) => {
                    pending.armed = false;
                    return Ok(());
                }
                Err(_e) if attempt < self.config.stop_retries => {
                    attempt += 1;
                    #[cfg(feature = "logging")]
                    log::warn!(
                        "Stop transfer failed ({}), retry {}/{}",
                        _e,
                        attempt,
                        self.config.stop_retries
                    );
                    tokio::time::sleep(self.config.stop_retry_interval).await;
                }
                Err(e) => {
                    pending.armed = false;
                    #[cfg(feature = "logging")]
                    log::error!("Stop transfer failed, motor may still be running: {}", e);
                    return Err(e);
                }
            }
        }
    }
}

/// 一次动作中尚未确认的停止传输。
///
/// 如果操作的 future 在启动传输或等待期间被丢弃，`Drop` 会同步补发停止负载。
struct PendingStop<'a, T: ControlTransport> {
    transport: &'a mut T,
    payload: [u8; PAYLOAD_LEN],
    armed: bool,
}

impl<T: ControlTransport> PendingStop<'_, T> {
    async fn send(&mut self, data: [u8; PAYLOAD_LEN], phase: TransferPhase) -> Result<(), ArmError> {
        transfer(&mut *self.transport, data, phase).await
    }
}

impl<T: ControlTransport> Drop for PendingStop<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            #[cfg(feature = "logging")]
            log::warn!("Actuation cancelled, sending stop");
            let result = self
                .transport
                .control_out_blocking(&ControlSetup::arm_command(), &self.payload);
            if let Err(_e) = check_transferred(result, TransferPhase::Stop) {
                #[cfg(feature = "logging")]
                log::error!("Stop after cancellation failed: {}", _e);
            }
        }
    }
}

/// 发送一次 3 字节控制传输。
async fn transfer<T: ControlTransport>(
    transport: &mut T,
    data: [u8; PAYLOAD_LEN],
    phase: TransferPhase,
) -> Result<(), ArmError> {
    let result = transport
        .control_out(ControlSetup::arm_command(), data)
        .await;
    check_transferred(result, phase)
}

/// 设备确认的字节数必须等于负载长度。
fn check_transferred(
    result: Result<usize, rusb::Error>,
    phase: TransferPhase,
) -> Result<(), ArmError> {
    match result {
        Ok(transferred) if transferred == PAYLOAD_LEN => Ok(()),
        Ok(transferred) => {
            #[cfg(feature = "logging")]
            log::warn!(
                "Transfer incomplete in {} phase: {} of {}",
                phase,
                transferred,
                PAYLOAD_LEN
            );
            Err(ArmError::TransferFailed {
                phase,
                fault: TransferFault::Short {
                    transferred,
                    expected: PAYLOAD_LEN,
                },
            })
        }
        Err(e) => Err(ArmError::TransferFailed {
            phase,
            fault: TransferFault::Usb(e),
        }),
    }
}
