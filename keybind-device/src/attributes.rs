//! Collection of the stable device attributes a fingerprint is built from.
//!
//! Only values that survive an app reinstall or data wipe are used. Any
//! attribute the platform cannot provide is recorded as an empty string.

use serde::{Deserialize, Serialize};
use std::env;

/// The attributes hashed into a [`crate::DeviceFingerprint`].
///
/// Field order matches the hashing order in [`DeviceAttributes::components`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAttributes {
    /// Operating system name.
    pub os_name: String,
    /// CPU architecture.
    pub os_arch: String,
    /// Operating system version string.
    pub os_version: String,
    /// Logical processor count.
    pub cpu_count: usize,
    /// Board identifier.
    pub board: String,
    /// Brand / vendor identifier.
    pub brand: String,
    /// Device codename.
    pub device: String,
    /// Hardware identifier.
    pub hardware: String,
    /// Marketing model name.
    pub model: String,
    /// Product codename.
    pub product: String,
}

impl DeviceAttributes {
    /// Collects attributes for the current device.
    #[must_use]
    pub fn collect() -> Self {
        let hw = platform::hardware();
        Self {
            os_name: env::consts::OS.to_string(),
            os_arch: env::consts::ARCH.to_string(),
            os_version: platform::os_version(),
            cpu_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(0),
            board: hw.board,
            brand: hw.brand,
            device: hw.device,
            hardware: hw.hardware,
            model: hw.model,
            product: hw.product,
        }
    }

    /// Returns the attributes as text, in hashing order:
    ///
    /// 1. OS name, 2. OS architecture, 3. OS version, 4. processor count,
    /// 5. board, 6. brand, 7. device, 8. hardware, 9. model, 10. product.
    #[must_use]
    pub fn components(&self) -> [String; 10] {
        [
            self.os_name.clone(),
            self.os_arch.clone(),
            self.os_version.clone(),
            self.cpu_count.to_string(),
            self.board.clone(),
            self.brand.clone(),
            self.device.clone(),
            self.hardware.clone(),
            self.model.clone(),
            self.product.clone(),
        ]
    }

    /// Number of hardware-identifying strings (5-10) the platform supplied.
    #[must_use]
    pub fn hardware_fields_present(&self) -> usize {
        [
            &self.board,
            &self.brand,
            &self.device,
            &self.hardware,
            &self.model,
            &self.product,
        ]
        .iter()
        .filter(|v| !v.is_empty())
        .count()
    }
}

#[derive(Default)]
struct HardwareIds {
    board: String,
    brand: String,
    device: String,
    hardware: String,
    model: String,
    product: String,
}

#[cfg_attr(not(any(target_os = "android", target_os = "linux")), allow(dead_code))]
fn read_trimmed(path: &str) -> String {
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

#[cfg(target_os = "android")]
mod platform {
    use super::{read_trimmed, HardwareIds};

    fn getprop(name: &str) -> String {
        std::process::Command::new("getprop")
            .arg(name)
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    pub(super) fn os_version() -> String {
        read_trimmed("/proc/sys/kernel/osrelease")
    }

    pub(super) fn hardware() -> HardwareIds {
        HardwareIds {
            board: getprop("ro.product.board"),
            brand: getprop("ro.product.brand"),
            device: getprop("ro.product.device"),
            hardware: getprop("ro.hardware"),
            model: getprop("ro.product.model"),
            product: getprop("ro.product.name"),
        }
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use super::{read_trimmed, HardwareIds};

    const DMI: &str = "/sys/devices/virtual/dmi/id";

    pub(super) fn os_version() -> String {
        std::fs::read_to_string("/etc/os-release")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|l| l.starts_with("VERSION_ID="))
                    .map(|l| {
                        l.trim_start_matches("VERSION_ID=")
                            .trim_matches('"')
                            .to_string()
                    })
            })
            .unwrap_or_default()
    }

    fn cpu_model() -> String {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|l| l.starts_with("model name") || l.starts_with("Hardware"))
                    .and_then(|l| l.split_once(':'))
                    .map(|(_, v)| v.trim().to_string())
            })
            .unwrap_or_default()
    }

    pub(super) fn hardware() -> HardwareIds {
        HardwareIds {
            board: read_trimmed(&format!("{DMI}/board_name")),
            brand: read_trimmed(&format!("{DMI}/sys_vendor")),
            device: read_trimmed(&format!("{DMI}/product_family")),
            hardware: cpu_model(),
            model: read_trimmed(&format!("{DMI}/product_name")),
            product: read_trimmed(&format!("{DMI}/product_sku")),
        }
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use super::HardwareIds;

    fn sysctl(name: &str) -> String {
        std::process::Command::new("sysctl")
            .args(["-n", name])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    pub(super) fn os_version() -> String {
        std::process::Command::new("sw_vers")
            .arg("-productVersion")
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    pub(super) fn hardware() -> HardwareIds {
        HardwareIds {
            board: sysctl("hw.target"),
            brand: "Apple".to_string(),
            device: sysctl("hw.product"),
            hardware: sysctl("machdep.cpu.brand_string"),
            model: sysctl("hw.model"),
            product: String::new(),
        }
    }
}

#[cfg(not(any(target_os = "android", target_os = "linux", target_os = "macos")))]
mod platform {
    use super::HardwareIds;

    pub(super) fn os_version() -> String {
        String::new()
    }

    pub(super) fn hardware() -> HardwareIds {
        HardwareIds::default()
    }
}
