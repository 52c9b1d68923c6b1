//! Device path encoder
//!
//! Builds Open Firmware style device paths (`/pci@i0cf8/isa@1,2`) by
//! walking a device's parent chain from the root bus down. Each node holds
//! a borrowed link to its parent; the chain always ends at a root bus.

use alloc::string::String;
use core::fmt::Write;

/// Root segment of every PCI path (I/O port 0xcf8 config mechanism)
pub const FW_PCI_DOMAIN: &str = "/pci@i0cf8";

/// Label used for every intermediate bridge hop
pub const PCI_BRIDGE_LABEL: &str = "pci-bridge";

/// A PCI function and the bridge it sits behind
#[derive(Debug, Clone, Copy)]
pub struct PciDevice<'a> {
    /// bus << 8 | device << 3 | function
    pub bdf: u16,
    /// Root bus number; only meaningful when `parent` is `None`
    pub rootbus: u8,
    pub parent: Option<&'a PciDevice<'a>>,
}

impl<'a> PciDevice<'a> {
    pub const fn root(bdf: u16, rootbus: u8) -> Self {
        Self {
            bdf,
            rootbus,
            parent: None,
        }
    }

    pub const fn behind(bdf: u16, parent: &'a PciDevice<'a>) -> Self {
        Self {
            bdf,
            rootbus: 0,
            parent: Some(parent),
        }
    }

    pub const fn dev(&self) -> u8 {
        ((self.bdf >> 3) & 0x1f) as u8
    }

    pub const fn func(&self) -> u8 {
        (self.bdf & 0x07) as u8
    }
}

/// Pack a bus/device/function triple
pub const fn bdf(bus: u8, dev: u8, func: u8) -> u16 {
    ((bus as u16) << 8) | (((dev & 0x1f) as u16) << 3) | (func & 0x07) as u16
}

/// A USB hub. The root hub of a controller has no upstream device.
#[derive(Debug, Clone, Copy)]
pub struct UsbHub<'a> {
    /// Host controller's PCI function
    pub controller: &'a PciDevice<'a>,
    /// The device this hub is, `None` for the root hub
    pub upstream: Option<&'a UsbDevice<'a>>,
}

/// A device on one port of a hub (0-based port)
#[derive(Debug, Clone, Copy)]
pub struct UsbDevice<'a> {
    pub hub: &'a UsbHub<'a>,
    pub port: u32,
}

/// Append the bus path of `pci` to `out`, naming the leaf `label`.
pub fn build_pci_path(out: &mut String, label: &str, pci: &PciDevice<'_>) {
    match pci.parent {
        Some(parent) => build_pci_path(out, PCI_BRIDGE_LABEL, parent),
        None => {
            out.push_str(FW_PCI_DOMAIN);
            if pci.rootbus != 0 {
                let _ = write!(out, ",{:x}", pci.rootbus);
            }
        }
    }

    let _ = write!(out, "/{}@{:x}", label, pci.dev());
    if pci.func() != 0 {
        let _ = write!(out, ",{:x}", pci.func());
    }
}

/// Append one `/hub@N` segment per external hub between the root hub and
/// `hub`, outermost first.
pub fn build_usb_path(out: &mut String, hub: &UsbHub<'_>) {
    let Some(usbdev) = hub.upstream else {
        return;
    };
    build_usb_path(out, usbdev.hub);
    let _ = write!(out, "/hub@{:x}", usbdev.port + 1);
}
