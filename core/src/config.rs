//! Boot configuration
//!
//! Settings come from the firmware's named config files (fw_cfg/CBFS
//! "romfiles"). Missing files fall back to the defaults below; nothing
//! here can fail.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

use crate::candidate::DefaultPriorities;
use crate::menu::keys::MenuKey;
use crate::order::BootOrder;

/// Well-known config file names
pub mod keys {
    pub const BOOTORDER: &str = "bootorder";
    pub const BOOT_FAIL_WAIT: &str = "etc/boot-fail-wait";
    pub const SHOW_BOOT_MENU: &str = "etc/show-boot-menu";
    pub const BOOT_MENU_KEY: &str = "etc/boot-menu-key";
    pub const BOOT_MENU_WAIT: &str = "etc/boot-menu-wait";
    pub const BOOT_MENU_MESSAGE: &str = "etc/boot-menu-message";
}

pub const DEFAULT_BOOT_FAIL_WAIT_MS: u32 = 60 * 1000;
pub const DEFAULT_BOOTMENU_WAIT_MS: u32 = 2500;
pub const SELECTION_TIMEOUT_MS: u32 = 15000;
pub const ESC_DEBOUNCE_MS: u32 = 1500;

/// Menu descriptions are cut to this many characters
pub const DESCRIPTION_WIDTH: usize = 59;

/// `etc/boot-fail-wait` value meaning "never retry"
pub const RETRY_FOREVER: u32 = u32::MAX;

/// Named config file lookup
pub trait ConfigSource {
    fn load_file(&self, name: &str) -> Option<String>;

    /// Integer setting; accepts decimal or `0x` hex text.
    fn load_int(&self, name: &str, default: u64) -> u64 {
        self.load_file(name)
            .and_then(|text| parse_int(text.trim()))
            .unwrap_or(default)
    }
}

pub fn parse_int(text: &str) -> Option<u64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// In-memory config files
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    files: BTreeMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, contents: &str) -> Self {
        self.insert(name, contents);
        self
    }

    pub fn insert(&mut self, name: &str, contents: &str) {
        self.files.insert(name.to_string(), contents.to_string());
    }
}

impl ConfigSource for MapConfig {
    fn load_file(&self, name: &str) -> Option<String> {
        self.files.get(name).cloned()
    }
}

/// What BootFail does after printing its message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Wait this long, then restart the platform
    After(u32),
    /// Never restart; park the machine
    Never,
}

impl RetryPolicy {
    pub fn from_ms(ms: u32) -> Self {
        if ms == RETRY_FOREVER {
            Self::Never
        } else {
            Self::After(ms)
        }
    }
}

/// Everything the menu and executor need to know
#[derive(Debug, Clone)]
pub struct BootConfig {
    pub retry: RetryPolicy,
    /// `etc/show-boot-menu`
    pub menu_enabled: bool,
    pub menu_wait_ms: u32,
    pub menu_key: MenuKey,
    /// Printed before the countdown prompt
    pub menu_message: Option<String>,
    pub selection_timeout_ms: u32,
    pub esc_debounce_ms: u32,
    /// Require the 0xaa55 signature on floppy boot sectors
    pub check_floppy_sig: bool,
    pub defaults: DefaultPriorities,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::After(DEFAULT_BOOT_FAIL_WAIT_MS),
            menu_enabled: true,
            menu_wait_ms: DEFAULT_BOOTMENU_WAIT_MS,
            menu_key: MenuKey::F12,
            menu_message: None,
            selection_timeout_ms: SELECTION_TIMEOUT_MS,
            esc_debounce_ms: ESC_DEBOUNCE_MS,
            check_floppy_sig: true,
            defaults: DefaultPriorities::default(),
        }
    }
}

impl BootConfig {
    pub fn load<C: ConfigSource + ?Sized>(src: &C) -> Self {
        let defaults = Self::default();
        let retry_ms = src.load_int(keys::BOOT_FAIL_WAIT, DEFAULT_BOOT_FAIL_WAIT_MS as u64);
        let menu_key = src.load_int(keys::BOOT_MENU_KEY, MenuKey::F12.packed());

        Self {
            retry: RetryPolicy::from_ms(retry_ms as u32),
            menu_enabled: src.load_int(keys::SHOW_BOOT_MENU, 1) != 0,
            menu_wait_ms: src.load_int(keys::BOOT_MENU_WAIT, DEFAULT_BOOTMENU_WAIT_MS as u64)
                as u32,
            menu_key: MenuKey::from_packed(menu_key),
            menu_message: src.load_file(keys::BOOT_MENU_MESSAGE),
            ..defaults
        }
    }

    /// Apply the legacy NVRAM boot device order (emulator platforms).
    pub fn with_cmos_bootflags(mut self, flag1: u8, flag2: u8) -> Self {
        self.defaults = DefaultPriorities::from_cmos_bootflags(flag1, flag2);
        self.check_floppy_sig = flag1 & 1 == 0;
        self
    }

    /// Parse the `bootorder` file. Absent file disables prioritized ordering.
    pub fn boot_order<C: ConfigSource + ?Sized>(src: &C) -> BootOrder {
        BootOrder::load(src.load_file(keys::BOOTORDER).as_deref())
    }
}
