//! Read-only pointer device inventory
//!
//! Gathers display-only descriptors for connected pointing devices.
//! Individual attributes are frequently absent depending on bus and
//! driver, so every lookup degrades to an empty string instead of
//! failing the whole enumeration. Nothing in the capture pipeline
//! depends on this data.

/// Descriptor of one connected pointing device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerDeviceInfo {
    pub name: String,
    pub manufacturer: String,
    pub interface: String,
    pub driver_version: String,
    pub bus_id: String,
}

#[cfg(target_os = "linux")]
mod sysfs {
    use super::PointerDeviceInfo;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn read_attr(path: &Path) -> String {
        fs::read_to_string(path)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    /// Search a handful of ancestor directories for an attribute file;
    /// how deep the USB/HID hierarchy nests varies by bus.
    fn probe_ancestors(start: &Path, attr: &str) -> String {
        let mut dir: PathBuf = start.to_path_buf();
        for _ in 0..5 {
            let candidate = dir.join(attr);
            if candidate.is_file() {
                let value = read_attr(&candidate);
                if !value.is_empty() {
                    return value;
                }
            }
            let Some(parent) = dir.parent().map(Path::to_path_buf) else {
                break;
            };
            dir = parent;
        }
        String::new()
    }

    fn bus_name(bustype: &str) -> String {
        match u16::from_str_radix(bustype, 16).ok() {
            Some(0x01) => "PCI".to_string(),
            Some(0x03) => "USB".to_string(),
            Some(0x05) => "Bluetooth".to_string(),
            Some(0x06) => "Virtual".to_string(),
            Some(0x11) => "PS/2".to_string(),
            Some(0x18) => "I2C".to_string(),
            Some(0x19) => "Host".to_string(),
            Some(0x1c) => "SPI".to_string(),
            Some(other) => format!("bus 0x{:02x}", other),
            None => String::new(),
        }
    }

    fn reports_relative_axes(sys_device: &Path) -> bool {
        let caps = read_attr(&sys_device.join("capabilities/rel"));
        caps.split_whitespace()
            .last()
            .and_then(|low| u64::from_str_radix(low, 16).ok())
            .map(|bits| bits & 0x3 == 0x3)
            .unwrap_or(false)
    }

    pub fn connected_mice() -> Vec<PointerDeviceInfo> {
        let mut mice = Vec::new();

        let class_dir = Path::new("/sys/class/input");
        let entries = match fs::read_dir(class_dir) {
            Ok(entries) => entries,
            Err(_) => return mice,
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| n.starts_with("event"))
            .collect();
        names.sort();

        for entry in names {
            let sys_device = class_dir.join(&entry).join("device");
            if !reports_relative_axes(&sys_device) {
                continue;
            }

            let vendor = read_attr(&sys_device.join("id/vendor"));
            let product = read_attr(&sys_device.join("id/product"));
            let bus_id = if vendor.is_empty() && product.is_empty() {
                String::new()
            } else {
                format!("{}:{}", vendor, product)
            };

            mice.push(PointerDeviceInfo {
                name: read_attr(&sys_device.join("name")),
                manufacturer: probe_ancestors(&sys_device, "manufacturer"),
                interface: bus_name(&read_attr(&sys_device.join("id/bustype"))),
                driver_version: read_attr(&sys_device.join("id/version")),
                bus_id,
            });
        }

        mice
    }
}

/// Enumerate connected pointing devices for display.
#[cfg(target_os = "linux")]
pub fn connected_mice() -> Vec<PointerDeviceInfo> {
    sysfs::connected_mice()
}

/// Enumerate connected pointing devices for display.
#[cfg(not(target_os = "linux"))]
pub fn connected_mice() -> Vec<PointerDeviceInfo> {
    Vec::new()
}

impl PointerDeviceInfo {
    /// One-line header, name plus interface when known.
    pub fn header(&self) -> String {
        if self.interface.is_empty() {
            self.name.clone()
        } else {
            format!("{}  [{}]", self.name, self.interface)
        }
    }
}
