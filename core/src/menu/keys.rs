//! Raw keyboard scan codes and the configurable menu key

pub const RAWKEY_ESC: u8 = 0x01;
pub const RAWKEY_1: u8 = 0x02;
pub const RAWKEY_9: u8 = 0x0a;
pub const RAWKEY_ENTER: u8 = 0x1c;
pub const RAWKEY_F1: u8 = 0x3b;
pub const RAWKEY_F9: u8 = 0x43;
pub const RAWKEY_F10: u8 = 0x44;
pub const RAWKEY_F11: u8 = 0x85;
pub const RAWKEY_F12: u8 = 0x86;

/// Map F1..F9 onto the digit keys 1..9; other codes pass through.
pub const fn fkey_to_digit(scan: u8) -> u8 {
    if scan >= RAWKEY_F1 && scan <= RAWKEY_F9 {
        RAWKEY_1 + (scan - RAWKEY_F1)
    } else {
        scan
    }
}

/// Menu position a scan code selects. Digit keys start at 1; ESC is 0.
pub const fn menu_index(scan: u8) -> usize {
    scan.saturating_sub(1) as usize
}

/// Menu key as stored in `etc/boot-menu-key`.
///
/// Little-endian u64: bits 0-15 scan code, then up to six label bytes
/// NUL-terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuKey {
    raw: [u8; 8],
}

impl MenuKey {
    pub const ESC: Self = Self::make(RAWKEY_ESC, b"ESC");
    pub const F1: Self = Self::make(RAWKEY_F1, b"F1");
    pub const F11: Self = Self::make(RAWKEY_F11, b"F11");
    pub const F12: Self = Self::make(RAWKEY_F12, b"F12");

    const fn make(scan: u8, label: &[u8]) -> Self {
        let mut raw = [0u8; 8];
        raw[0] = scan;
        let mut i = 0;
        while i < label.len() && i < 5 {
            raw[2 + i] = label[i];
            i += 1;
        }
        Self { raw }
    }

    pub const fn from_packed(packed: u64) -> Self {
        Self {
            raw: packed.to_le_bytes(),
        }
    }

    pub const fn packed(&self) -> u64 {
        u64::from_le_bytes(self.raw)
    }

    pub const fn code(&self) -> u16 {
        u16::from_le_bytes([self.raw[0], self.raw[1]])
    }

    pub fn matches(&self, scan: u8) -> bool {
        self.code() == scan as u16
    }

    /// Label shown in the "press KEY" prompt
    pub fn text(&self) -> &str {
        let label = &self.raw[2..];
        let end = label.iter().position(|&b| b == 0).unwrap_or(label.len());
        core::str::from_utf8(&label[..end]).unwrap_or("")
    }
}
