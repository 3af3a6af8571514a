//! 机械臂库的 USB 底层操作。

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusb::{Context, Device, DeviceHandle, UsbContext};

use crate::modules::constants::{INTERFACE, PAYLOAD_LEN};
use crate::modules::error::ArmError;
use crate::modules::types::{ControlSetup, DeviceInfo};

/// 控制 OUT 传输：向端点 0 发送数据，返回设备确认的字节数。
pub trait ControlTransport: Send {
    /// 异步发送，等待期间不占用运行时线程。
    fn control_out(
        &mut self,
        setup: ControlSetup,
        data: [u8; PAYLOAD_LEN],
    ) -> impl Future<Output = Result<usize, rusb::Error>> + Send;

    /// 同步发送，只用于无法 await 的地方（取消后在 `Drop` 里补发停止）。
    fn control_out_blocking(
        &mut self,
        setup: &ControlSetup,
        data: &[u8],
    ) -> Result<usize, rusb::Error>;
}

/// 设备发现：按 VID/PID 列出候选设备，并打开其中之一。
pub trait DeviceFinder {
    type Candidate;
    type Transport: ControlTransport;

    fn find(&self, vid: u16, pid: u16) -> Result<Vec<Self::Candidate>, ArmError>;

    fn open(&self, candidate: &Self::Candidate) -> Result<Self::Transport, ArmError>;
}

/// 会阻塞当前线程的控制传输（例如 libusb 调用）。
pub trait BlockingControl: Send + 'static {
    fn write_control(&mut self, setup: &ControlSetup, data: &[u8]) -> Result<usize, rusb::Error>;
}

/// 把阻塞式传输放到 tokio 的阻塞线程池上执行。
pub struct BlockingTransport<B> {
    inner: Arc<Mutex<B>>,
}

impl<B: BlockingControl> BlockingTransport<B> {
    pub fn new(control: B) -> Self {
        Self {
            inner: Arc::new(Mutex::new(control)),
        }
    }
}

impl<B: BlockingControl> ControlTransport for BlockingTransport<B> {
    fn control_out(
        &mut self,
        setup: ControlSetup,
        data: [u8; PAYLOAD_LEN],
    ) -> impl Future<Output = Result<usize, rusb::Error>> + Send {
        let inner = Arc::clone(&self.inner);
        async move {
            tokio::task::spawn_blocking(move || lock(&inner).write_control(&setup, &data))
                .await
                .unwrap_or_else(|_e| {
                    #[cfg(feature = "logging")]
                    log::error!("USB control task failed: {}", _e);
                    Err(rusb::Error::Other)
                })
        }
    }

    fn control_out_blocking(
        &mut self,
        setup: &ControlSetup,
        data: &[u8],
    ) -> Result<usize, rusb::Error> {
        lock(&self.inner).write_control(setup, data)
    }
}

/// 传输线程 panic 后句柄本身仍然可用。
fn lock<B>(inner: &Mutex<B>) -> MutexGuard<'_, B> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 基于 rusb 的阻塞式控制传输。
pub struct RusbControl {
    /// 设备句柄。
    handle: DeviceHandle<Context>,
    /// 传输超时。
    timeout: Duration,
    /// 是否已声明接口。
    interface_claimed: bool,
}

/// 生产环境使用的传输。
pub type RusbTransport = BlockingTransport<RusbControl>;

impl RusbControl {
    /// 包装已打开的句柄：必要时分离内核驱动并声明接口。
    pub fn new(handle: DeviceHandle<Context>, timeout: Duration) -> Result<Self, rusb::Error> {
        // 先分离内核驱动，否则无法声明接口
        if let Ok(true) = handle.kernel_driver_active(INTERFACE) {
            #[cfg(feature = "logging")]
            log::info!("Detaching kernel driver from interface {}", INTERFACE);
            if let Err(_e) = handle.detach_kernel_driver(INTERFACE) {
                #[cfg(feature = "logging")]
                log::warn!("Failed to detach kernel driver: {}", _e);
            }
        }

        handle.claim_interface(INTERFACE).map_err(|e| {
            #[cfg(feature = "logging")]
            log::error!("Failed to claim interface {}: {}", INTERFACE, e);
            e
        })?;

        Ok(Self {
            handle,
            timeout,
            interface_claimed: true,
        })
    }

    /// 释放接口（可重复调用）。
    pub fn release_interface(&mut self) {
        if self.interface_claimed {
            // 设备可能已断开，忽略错误
            let _ = self.handle.release_interface(INTERFACE);
            self.interface_claimed = false;
            #[cfg(feature = "logging")]
            log::debug!("Interface {} released", INTERFACE);
        }
    }
}

impl BlockingControl for RusbControl {
    fn write_control(&mut self, setup: &ControlSetup, data: &[u8]) -> Result<usize, rusb::Error> {
        let result = self.handle.write_control(
            setup.request_type,
            setup.request,
            setup.value,
            setup.index,
            data,
            self.timeout,
        );

        #[cfg(feature = "logging")]
        {
            match &result {
                Ok(written) => log::debug!("USB control out: {} of {} bytes", written, data.len()),
                Err(e) => log::error!("USB control out failed: {}", e),
            }
        }

        result
    }
}

impl Drop for RusbControl {
    fn drop(&mut self) {
        self.release_interface();
    }
}

/// 基于 rusb 的设备发现。
pub struct RusbFinder {
    context: Context,
    timeout: Duration,
}

impl RusbFinder {
    /// 创建 USB 上下文，打开的设备使用给定的传输超时。
    pub fn with_timeout(timeout: Duration) -> Result<Self, ArmError> {
        let context = Context::new().map_err(|e| {
            #[cfg(feature = "logging")]
            log::error!("Failed to create USB context: {}", e);
            ArmError::Enumeration(e)
        })?;
        Ok(Self { context, timeout })
    }
}

impl DeviceFinder for RusbFinder {
    type Candidate = Device<Context>;
    type Transport = RusbTransport;

    fn find(&self, vid: u16, pid: u16) -> Result<Vec<Self::Candidate>, ArmError> {
        let devices = self.context.devices().map_err(|e| {
            #[cfg(feature = "logging")]
            log::error!("Failed to get devices: {}", e);
            ArmError::Enumeration(e)
        })?;

        let matches: Vec<_> = devices
            .iter()
            .filter(|device| {
                device
                    .device_descriptor()
                    .map(|desc| desc.vendor_id() == vid && desc.product_id() == pid)
                    .unwrap_or(false)
            })
            .collect();

        #[cfg(feature = "logging")]
        log::debug!("Found {} candidates for {:04x}:{:04x}", matches.len(), vid, pid);
        Ok(matches)
    }

    fn open(&self, candidate: &Self::Candidate) -> Result<Self::Transport, ArmError> {
        #[cfg(feature = "logging")]
        log::info!(
            "Opening arm at bus {:03} addr {:03}...",
            candidate.bus_number(),
            candidate.address()
        );

        let handle = candidate.open().map_err(|e| {
            #[cfg(feature = "logging")]
            log::error!("Failed to open device: {}", e);
            ArmError::DeviceOpen(e)
        })?;

        let control = RusbControl::new(handle, self.timeout).map_err(ArmError::DeviceOpen)?;
        Ok(BlockingTransport::new(control))
    }
}

/// 扫描所有 USB 设备。
pub fn scan_devices() -> Vec<DeviceInfo> {
    #[cfg(feature = "logging")]
    log::info!("Scanning USB devices...");
    let context = match Context::new() {
        Ok(c) => c,
        Err(_e) => {
            #[cfg(feature = "logging")]
            log::error!("Failed to create USB context: {}", _e);
            return Vec::new();
        }
    };

    let mut devices = Vec::new();

    match context.devices() {
        Ok(dev_list) => {
            for device in dev_list.iter() {
                if let Ok(desc) = device.device_descriptor() {
                    devices.push(DeviceInfo {
                        vid: desc.vendor_id(),
                        pid: desc.product_id(),
                        bus: device.bus_number(),
                        address: device.address(),
                    });
                }
            }
        }
        Err(_e) => {
            #[cfg(feature = "logging")]
            log::error!("Failed to get device list: {}", _e);
        }
    }

    #[cfg(feature = "logging")]
    log::info!("Found {} USB devices", devices.len());
    devices
}
