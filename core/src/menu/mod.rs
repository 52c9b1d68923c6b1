//! Interactive boot menu
//!
//! ```text
//!  AutoselectRecovery ──(menu disabled / no debug jumper)──────────┐
//!         │                                                        │
//!   ShowCountdown ── AwaitMenuKey ──(timeout / other key)──────────┤
//!                        │    └──(F1 + splash)── Paused ── reset   │
//!                  (menu key / Enter)                              │
//!                        │                                         │
//!                 ShowDeviceList ── AwaitSelection ──(pick/Enter)──┴─> Done
//! ```
//!
//! Recovery autoselect always runs first, so a board nobody is watching
//! still walks through its boot entries after repeated payload failures.

pub mod input;
pub mod keys;
pub mod recovery;

use alloc::format;

use crate::candidate::BootRegistry;
use crate::config::{BootConfig, DESCRIPTION_WIDTH};
use crate::platform::{Console, MenuPlatform, RegisterStore};
use crate::regs::{self, stage, BootSourceType, REG_BIOS_BOOT_SOURCE};

use input::{drain_keys, get_keystroke, Deadline, Timeout};
use keys::{fkey_to_digit, menu_index, RAWKEY_ENTER, RAWKEY_ESC, RAWKEY_F1};

pub use recovery::{RecoveryDecision, RecoveryRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    AutoselectRecovery,
    ShowCountdown,
    AwaitMenuKey,
    Paused,
    ShowDeviceList,
    AwaitSelection,
    Done,
}

impl MenuState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AutoselectRecovery => "autoselect",
            Self::ShowCountdown => "countdown",
            Self::AwaitMenuKey => "await-menu-key",
            Self::Paused => "paused",
            Self::ShowDeviceList => "device-list",
            Self::AwaitSelection => "await-selection",
            Self::Done => "done",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Result of one menu run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuOutcome {
    /// 1-based entry recorded in the boot-source register
    pub selection: usize,
    /// Who picked it
    pub rule: Option<RecoveryRule>,
    /// Operator picked an entry from the device list
    pub operator_choice: bool,
    /// A platform restart was requested from the paused splash
    pub restarted: bool,
}

/// Cut a description to the menu column width on a char boundary
pub fn menu_description(desc: &str) -> &str {
    match desc.char_indices().nth(DESCRIPTION_WIDTH) {
        Some((cut, _)) => &desc[..cut],
        None => desc,
    }
}

/// Promote the `choice`-th entry and announce it.
pub fn select<C: Console + ?Sized>(registry: &mut BootRegistry, choice: usize, console: &mut C) {
    if let Some(entry) = registry.select_and_promote(choice) {
        console.print(&format!(
            "\nChose bootmenu item {}: {}\n\n",
            choice, entry.description
        ));
    }
}

/// Store the boot source type of the front entry and the chosen position.
pub fn record_selection<R: RegisterStore + ?Sized>(regs: &mut R, registry: &BootRegistry, choice: usize) {
    let kind = registry
        .first()
        .map(|c| BootSourceType::classify(&c.description))
        .unwrap_or(BootSourceType::None);
    regs.write_u8(REG_BIOS_BOOT_SOURCE, kind.encode(choice));
}

/// The boot menu state machine. Runs once per boot, before flattening.
pub struct InteractiveMenu<'a> {
    config: &'a BootConfig,
    state: MenuState,
    selection: usize,
    rule: Option<RecoveryRule>,
    operator_choice: bool,
    splash_shown: bool,
    restarted: bool,
    esc_accepted: Option<Deadline>,
}

impl<'a> InteractiveMenu<'a> {
    pub fn new(config: &'a BootConfig) -> Self {
        Self {
            config,
            state: MenuState::AutoselectRecovery,
            selection: 0,
            rule: None,
            operator_choice: false,
            splash_shown: false,
            restarted: false,
            esc_accepted: None,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    /// Drive the machine to `Done`.
    pub fn run<P: MenuPlatform + ?Sized>(
        mut self,
        io: &mut P,
        registry: &mut BootRegistry,
    ) -> MenuOutcome {
        regs::mark_bios_happy(io);

        while !self.state.is_terminal() {
            let next = self.step(io, registry);
            log::debug!("bootmenu: {} -> {}", self.state.as_str(), next.as_str());
            self.state = next;
        }
        self.finish(io, registry);

        MenuOutcome {
            selection: self.selection,
            rule: self.rule,
            operator_choice: self.operator_choice,
            restarted: self.restarted,
        }
    }

    fn step<P: MenuPlatform + ?Sized>(&mut self, io: &mut P, registry: &mut BootRegistry) -> MenuState {
        match self.state {
            MenuState::AutoselectRecovery => self.autoselect(io, registry),
            MenuState::ShowCountdown => self.show_countdown(io, registry),
            MenuState::AwaitMenuKey => self.await_menu_key(io),
            MenuState::Paused => self.paused(io),
            MenuState::ShowDeviceList => self.show_device_list(io, registry),
            MenuState::AwaitSelection => self.await_selection(io, registry),
            MenuState::Done => MenuState::Done,
        }
    }

    fn autoselect<P: MenuPlatform + ?Sized>(&mut self, io: &mut P, registry: &mut BootRegistry) -> MenuState {
        let decision = recovery::evaluate(io);
        select(registry, decision.index, io);
        record_selection(io, registry, decision.index);
        self.selection = decision.index;
        self.rule = Some(decision.rule);

        if !self.config.menu_enabled {
            return MenuState::Done;
        }
        // Menu is only offered with the debug (watchdog disable) jumper fitted
        if !regs::debug_enabled(io) {
            io.print_platform_info();
            return MenuState::Done;
        }
        MenuState::ShowCountdown
    }

    fn show_countdown<P: MenuPlatform + ?Sized>(&mut self, io: &mut P, registry: &BootRegistry) -> MenuState {
        regs::write_stage(io, stage::SB_SPLASH);

        io.print("\nBootmenu:\n");
        for (i, entry) in registry.iter().enumerate() {
            io.print(&format!("  {}. {}\n", i + 1, menu_description(&entry.description)));
        }

        drain_keys(io);

        if let Some(msg) = &self.config.menu_message {
            io.print(msg);
        }
        io.enable_splash(self.config.menu_key.text());
        self.splash_shown = true;
        MenuState::AwaitMenuKey
    }

    fn await_menu_key<P: MenuPlatform + ?Sized>(&mut self, io: &mut P) -> MenuState {
        io.begin_input_wait();
        let scan = get_keystroke(io, Timeout::Millis(self.config.menu_wait_ms));
        io.end_input_wait();

        match scan {
            // F1 freezes the splash; the next key reboots
            Some(RAWKEY_F1) if io.splash_active() => MenuState::Paused,
            Some(RAWKEY_ENTER) => MenuState::ShowDeviceList,
            Some(scan) if self.config.menu_key.matches(scan) => MenuState::ShowDeviceList,
            _ => MenuState::Done,
        }
    }

    fn paused<P: MenuPlatform + ?Sized>(&mut self, io: &mut P) -> MenuState {
        io.show_paused();
        io.begin_input_wait();
        let _ = get_keystroke(io, Timeout::Forever);
        io.end_input_wait();

        log::info!("Rebooting.");
        self.restarted = true;
        io.reset();
        MenuState::Done
    }

    fn show_device_list<P: MenuPlatform + ?Sized>(&mut self, io: &mut P, registry: &BootRegistry) -> MenuState {
        drain_keys(io);

        io.clear();
        io.print("Select boot device:\n\n");
        let count = registry.len();
        for (i, entry) in registry.iter().enumerate() {
            io.print(&format!("{}. {}\n", i + 1, menu_description(&entry.description)));
        }

        io.status(&format!(
            "Hit 1 - {} or F1 - F{} to boot or ESC to continue",
            count, count
        ));
        log::info!("Hit 1 - {} to boot or ENTER to continue", count);

        // Habitual Escape presses must not skip the list right away
        self.esc_accepted = Some(Deadline::after(&*io, self.config.esc_debounce_ms));
        MenuState::AwaitSelection
    }

    fn await_selection<P: MenuPlatform + ?Sized>(&mut self, io: &mut P, registry: &mut BootRegistry) -> MenuState {
        let count = registry.len();
        loop {
            io.begin_input_wait();
            let scan = get_keystroke(io, Timeout::Millis(self.config.selection_timeout_ms));
            io.end_input_wait();

            let Some(scan) = scan else {
                return MenuState::Done;
            };
            if scan == RAWKEY_ESC && self.esc_accepted.is_some_and(|d| !d.expired(&*io)) {
                continue;
            }
            if scan == RAWKEY_ENTER || scan == RAWKEY_ESC {
                io.print("\n");
                return MenuState::Done;
            }

            let index = menu_index(fkey_to_digit(scan));
            if (1..=count).contains(&index) {
                io.print("\n");
                select(registry, index, io);
                self.selection = index;
                self.rule = None;
                self.operator_choice = true;
                return MenuState::Done;
            }
        }
    }

    fn finish<P: MenuPlatform + ?Sized>(&mut self, io: &mut P, registry: &BootRegistry) {
        record_selection(io, registry, self.selection);
        if self.splash_shown {
            regs::write_stage(io, stage::SB_SPLASH_OFF);
        }
        io.disable_splash();
    }
}
