//! Candidate registry and BEV flattening tests

mod common;

use common::{disk, MockBoard};
use morpheus_bootcore::bev::flatten;
use morpheus_bootcore::{
    BevEntry, BootConfig, BootKind, BootOrder, BootRegistry, DriveRef, PayloadRef, SegOff,
};

fn order_of(reg: &BootRegistry) -> Vec<(i32, BootKind)> {
    reg.iter().map(|c| (c.priority, c.kind)).collect()
}

#[test]
fn test_priority_then_declared_kind_order() {
    let mut reg = BootRegistry::new();
    reg.add_hd(disk(1), None, Some(50)).unwrap();
    reg.add_cd(disk(2), None, Some(10)).unwrap();
    reg.add_hd(disk(3), None, Some(10)).unwrap();
    reg.add_floppy(disk(4), None, Some(30)).unwrap();

    assert_eq!(
        order_of(&reg),
        [
            (10, BootKind::HardDisk),
            (10, BootKind::CdRom),
            (30, BootKind::Floppy),
            (50, BootKind::HardDisk),
        ]
    );
}

#[test]
fn test_order_holds_after_every_insertion() {
    let mut reg = BootRegistry::new();
    let prios = [7, 3, 9, 3, 1, 7, 2];
    for (i, p) in prios.iter().enumerate() {
        reg.add_cbfs(PayloadRef(i as u32), None, Some(*p)).unwrap();
        let seen: Vec<i32> = reg.iter().map(|c| c.priority).collect();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "unsorted after {}: {:?}", i, seen);
    }
}

#[test]
fn test_iteration_is_restartable() {
    let mut reg = BootRegistry::new();
    reg.add_hd(disk(1), Some("a"), None).unwrap();
    reg.add_cd(disk(2), Some("b"), None).unwrap();

    let first: Vec<&str> = reg.iter().map(|c| c.description.as_str()).collect();
    let second: Vec<&str> = (&reg).into_iter().map(|c| c.description.as_str()).collect();
    assert_eq!(first, second);
}

#[test]
fn test_flatten_empty_registry() {
    let mut board = MockBoard::new();
    let mut reg = BootRegistry::new();
    let list = flatten(&mut reg, &BootOrder::default(), &mut board);

    let entries: Vec<BevEntry> = list.iter().copied().collect();
    assert_eq!(entries, [BevEntry::Floppy, BevEntry::HardDisk { drive_id: 0 }]);
}

#[test]
fn test_flatten_keeps_one_floppy() {
    let mut board = MockBoard::new();
    let mut reg = BootRegistry::new();
    for i in 0..3 {
        reg.add_floppy(DriveRef::new(i, 0x10, i), None, None).unwrap();
    }
    let list = flatten(&mut reg, &BootOrder::default(), &mut board);

    assert_eq!(board.mapped_floppies.len(), 3);
    assert_eq!(list.iter().filter(|e| **e == BevEntry::Floppy).count(), 1);
}

#[test]
fn test_promoted_candidate_boots_first() {
    let mut board = MockBoard::new();
    let mut reg = BootRegistry::new();
    reg.add_hd(disk(1), Some("AHCI/0: disk"), None).unwrap();
    reg.add_cd(disk(2), Some("DVD/CD [ata0-1]"), None).unwrap();
    reg.add_bev(SegOff::new(0xc900, 0x44), Some("iPXE"), None).unwrap();

    reg.select_and_promote(3);
    let list = flatten(&mut reg, &BootOrder::default(), &mut board);
    assert_eq!(list.get(0), Some(&BevEntry::Rom(SegOff::new(0xc900, 0x44))));
    assert_eq!(list.get(1), Some(&BevEntry::CdRom(disk(2))));
}

#[test]
fn test_bcv_runs_and_boots_as_hard_disk() {
    let mut board = MockBoard::new();
    let mut reg = BootRegistry::new();
    reg.add_bcv(SegOff::new(0xd000, 0x0003), None, None).unwrap();

    let list = flatten(&mut reg, &BootOrder::default(), &mut board);
    assert_eq!(board.bcv_calls, [SegOff::new(0xd000, 0x0003)]);
    assert_eq!(
        list.iter().map(|e| e.kind()).collect::<Vec<_>>(),
        [BootKind::HardDisk, BootKind::Floppy]
    );
}

#[test]
fn test_halt_line_cuts_the_sequence() {
    let order = BootOrder::parse("HALT\n/pci@i0cf8/*@1,1/drive@0/disk@0").unwrap();
    let mut board = MockBoard::new();
    let mut reg = BootRegistry::new();
    reg.add_hd(disk(1), None, Some(2)).unwrap();

    let list = flatten(&mut reg, &order, &mut board);
    assert_eq!(list.get(0), Some(&BevEntry::Halt));
    assert_eq!(reg.first().unwrap().description, "HALT");
}

#[test]
fn test_cmos_defaults_feed_registry() {
    // boot order "cdrom, disk, floppy" from NVRAM
    let config = BootConfig::default().with_cmos_bootflags(0x10, 0x23);
    let mut reg = BootRegistry::with_defaults(config.defaults);
    reg.add_floppy(disk(1), Some("floppy"), None).unwrap();
    reg.add_hd(disk(2), Some("disk"), None).unwrap();
    reg.add_cd(disk(3), Some("cd"), None).unwrap();

    let descs: Vec<&str> = reg.iter().map(|c| c.description.as_str()).collect();
    assert_eq!(descs, ["cd", "disk", "floppy"]);
}
