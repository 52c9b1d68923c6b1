//! Per-bus boot order lookups used by device drivers
//!
//! Each helper encodes the device's path with a wildcard leaf label and
//! asks the boot order for its rank. `None` means "use the kind default".

use alloc::format;
use alloc::string::String;
use core::fmt::Write;

use super::devpath::{build_pci_path, build_usb_path, PciDevice, UsbDevice};
use super::{BootOrder, Priority};

impl BootOrder {
    /// Any PCI function, e.g. `/pci@i0cf8/ethernet@5`
    pub fn find_pci_device(&self, pci: &PciDevice<'_>) -> Option<Priority> {
        let mut path = String::new();
        build_pci_path(&mut path, "*", pci);
        self.find_priority(&path).ok()
    }

    /// SCSI disk, e.g. `/pci@i0cf8/scsi@5/channel@0/disk@1,0`
    pub fn find_scsi_device(
        &self,
        pci: Option<&PciDevice<'_>>,
        target: u32,
        lun: u32,
    ) -> Option<Priority> {
        let pci = pci?;
        let mut path = String::new();
        build_pci_path(&mut path, "*", pci);
        let _ = write!(path, "/*@0/*@{:x},{:x}", target, lun);
        self.find_priority(&path).ok()
    }

    /// ATA disk, e.g. `/pci@i0cf8/ide@1,1/drive@1/disk@0`
    pub fn find_ata_device(
        &self,
        pci: Option<&PciDevice<'_>>,
        channel: u32,
        slave: u32,
    ) -> Option<Priority> {
        let pci = pci?;
        let mut path = String::new();
        build_pci_path(&mut path, "*", pci);
        let _ = write!(path, "/drive@{:x}/disk@{:x}", channel, slave);
        self.find_priority(&path).ok()
    }

    /// Floppy behind the ISA bridge, e.g. `/pci@i0cf8/isa@1/fdc@03f0/floppy@0`
    pub fn find_fdc_device(
        &self,
        pci: Option<&PciDevice<'_>>,
        port: u16,
        fdid: u32,
    ) -> Option<Priority> {
        let pci = pci?;
        let mut path = String::new();
        build_pci_path(&mut path, "isa", pci);
        let _ = write!(path, "/fdc@{:04x}/floppy@{:x}", port, fdid);
        self.find_priority(&path).ok()
    }

    /// PCI option ROM, e.g. `/pci@i0cf8/scsi@3:rom2`
    pub fn find_pci_rom(&self, pci: &PciDevice<'_>, instance: u32) -> Option<Priority> {
        let mut path = String::new();
        build_pci_path(&mut path, "*", pci);
        if instance != 0 {
            let _ = write!(path, ":rom{:x}", instance);
        }
        self.find_priority(&path).ok()
    }

    /// ROM loaded from a named file, e.g. `/rom@genroms/linuxboot.bin`
    pub fn find_named_rom(&self, name: &str, instance: u32) -> Option<Priority> {
        let mut path = format!("/rom@{}", name);
        if instance != 0 {
            let _ = write!(path, ":rom{:x}", instance);
        }
        self.find_priority(&path).ok()
    }

    /// USB mass storage, e.g. `/pci@i0cf8/usb@1,2/storage@1/channel@0/disk@0,0`,
    /// then USB host redirection, e.g. `/pci@i0cf8/usb@1,2/usb-host@1`.
    pub fn find_usb(&self, usbdev: &UsbDevice<'_>, lun: u32) -> Option<Priority> {
        let mut base = String::new();
        build_pci_path(&mut base, "usb", usbdev.hub.controller);
        build_usb_path(&mut base, usbdev.hub);

        let storage = format!("{}/storage@{:x}/*@0/*@0,{:x}", base, usbdev.port + 1, lun);
        if let Ok(prio) = self.find_priority(&storage) {
            return Some(prio);
        }

        let redirect = format!("{}/usb-*@{:x}", base, usbdev.port + 1);
        self.find_priority(&redirect).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::devpath::{bdf, UsbHub};

    fn order(text: &str) -> BootOrder {
        BootOrder::parse(text).unwrap()
    }

    #[test]
    fn test_ata_lookup() {
        let order = order("/pci@i0cf8/*@1,1/drive@1/disk@0\n/pci@i0cf8/*@1,1/drive@0/disk@0");
        let ide = PciDevice::root(bdf(0, 1, 1), 0);
        assert_eq!(order.find_ata_device(Some(&ide), 0, 0), Some(2));
        assert_eq!(order.find_ata_device(Some(&ide), 1, 0), Some(1));
        assert_eq!(order.find_ata_device(None, 0, 0), None);
    }

    #[test]
    fn test_fdc_lookup_uses_isa_label() {
        let order = order("/pci@i0cf8/isa@1/fdc@03f0/floppy@0");
        let isa = PciDevice::root(bdf(0, 1, 0), 0);
        assert_eq!(order.find_fdc_device(Some(&isa), 0x3f0, 0), Some(1));
        assert_eq!(order.find_fdc_device(Some(&isa), 0x3f0, 1), None);
    }

    #[test]
    fn test_scsi_lookup() {
        let order = order("/pci@i0cf8/scsi@5/channel@0/disk@1,0");
        let hba = PciDevice::root(bdf(0, 5, 0), 0);
        assert_eq!(order.find_scsi_device(Some(&hba), 1, 0), Some(1));
        assert_eq!(order.find_scsi_device(Some(&hba), 2, 0), None);
    }

    #[test]
    fn test_rom_lookups() {
        let order = order("/pci@i0cf8/scsi@3:rom2\n/rom@genroms/linuxboot.bin\n/pci@i0cf8/ethernet@4");
        let scsi = PciDevice::root(bdf(0, 3, 0), 0);
        let nic = PciDevice::root(bdf(0, 4, 0), 0);
        assert_eq!(order.find_pci_rom(&scsi, 2), Some(1));
        assert_eq!(order.find_named_rom("genroms/linuxboot.bin", 0), Some(2));
        assert_eq!(order.find_pci_device(&nic), Some(3));
        assert_eq!(order.find_pci_rom(&nic, 0), Some(3));
    }

    #[test]
    fn test_usb_storage_then_redirect() {
        let order = order("/pci@i0cf8/usb@1d,7/usb-host@3\n/pci@i0cf8/usb@1d,7/hub@1/storage@2/*@0/*@0,0");
        let ehci = PciDevice::root(bdf(0, 0x1d, 7), 0);
        let root = UsbHub {
            controller: &ehci,
            upstream: None,
        };
        let hub_dev = UsbDevice { hub: &root, port: 0 };
        let ext = UsbHub {
            controller: &ehci,
            upstream: Some(&hub_dev),
        };

        let stick = UsbDevice { hub: &ext, port: 1 };
        assert_eq!(order.find_usb(&stick, 0), Some(2));

        let redirected = UsbDevice { hub: &root, port: 2 };
        assert_eq!(order.find_usb(&redirected, 0), Some(1));
    }
}
