#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! File-backed extract and inject tests.
//!
//! Every test writes a synthetic container into a temporary directory and
//! checks the bytes on disk after each operation.

use iflash_formats::{ContainerBuilder, HEADER_SIZE, IflashError, ImageKind, TailPolicy};
use iflash_tool::{ContainerFile, ToolError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Five records behind a small stub, with filler between them
fn write_full_container(dir: &Path) -> (PathBuf, Vec<(ImageKind, usize, u32)>) {
    let mut layout = Vec::new();
    let mut builder = ContainerBuilder::new().bytes(b"MZ").filler(126);

    for (kind, capacity, payload) in [
        (ImageKind::BiosImage, 512u32, vec![0x11; 400]),
        (ImageKind::IniImage, 128, b"[Platform]\nVersion=1\n".to_vec()),
        (ImageKind::EcImage, 256, vec![0x22; 256]),
        (ImageKind::Certificate, 64, b"-----BEGIN-----".to_vec()),
        (ImageKind::DriverImage, 300, vec![0x33; 10]),
    ] {
        layout.push((kind, builder.position(), capacity));
        builder = builder.record(kind, capacity, &payload).filler(40);
    }

    let path = dir.join("isflash.bin");
    std::fs::write(&path, builder.build()).unwrap();
    (path, layout)
}

#[test]
fn extract_every_kind_including_driver() {
    let dir = TempDir::new().unwrap();
    let (path, layout) = write_full_container(dir.path());
    let file = ContainerFile::open(&path).unwrap();

    for (kind, offset, _) in &layout {
        let out = dir.path().join(kind.default_file_name());
        let extracted = file.extract_to(*kind, &out).unwrap();
        assert_eq!(extracted.offset, *offset);
        assert_eq!(std::fs::read(&out).unwrap().len(), extracted.size);
    }

    assert_eq!(
        std::fs::read(dir.path().join("drv_img.bin")).unwrap(),
        vec![0x33; 10]
    );
    assert_eq!(
        std::fs::read(dir.path().join("platforms.ini")).unwrap(),
        b"[Platform]\nVersion=1\n"
    );
}

#[test]
fn inject_full_capacity_and_one_past() {
    let dir = TempDir::new().unwrap();
    let (path, _) = write_full_container(dir.path());
    let mut file = ContainerFile::open(&path).unwrap();

    let exact = vec![b'C'; 64];
    let injected = file
        .inject(ImageKind::Certificate, &exact, TailPolicy::LeaveStale)
        .unwrap();
    assert_eq!(injected.new_size, 64);
    assert_eq!(injected.capacity, 64);

    let before = std::fs::read(&path).unwrap();
    let result = file.inject(ImageKind::Certificate, &[b'C'; 65], TailPolicy::LeaveStale);
    assert!(matches!(
        result,
        Err(ToolError::Record {
            source: IflashError::CapacityExceeded {
                requested: 65,
                capacity: 64
            },
            ..
        })
    ));
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn inject_from_file_reloads_consistently() {
    let dir = TempDir::new().unwrap();
    let (path, _) = write_full_container(dir.path());
    let input = dir.path().join("platforms.ini");
    std::fs::write(&input, b"[Platform]\nVersion=2\nBuild=9\n").unwrap();

    {
        let mut file = ContainerFile::open(&path).unwrap();
        file.inject_from(ImageKind::IniImage, &input, TailPolicy::ZeroFill)
            .unwrap();
    }

    let reopened = ContainerFile::open(&path).unwrap();
    let out = dir.path().join("check.ini");
    reopened.extract_to(ImageKind::IniImage, &out).unwrap();
    assert_eq!(
        std::fs::read(&out).unwrap(),
        b"[Platform]\nVersion=2\nBuild=9\n"
    );

    let record = reopened.locate(ImageKind::IniImage).unwrap();
    let bytes = reopened.container().as_bytes();
    assert!(
        bytes[record.payload_end()..record.capacity_end()]
            .iter()
            .all(|&b| b == 0)
    );
}

#[test]
fn inject_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let (path, _) = write_full_container(dir.path());
    let before = std::fs::read(&path).unwrap();
    let mut file = ContainerFile::open(&path).unwrap();

    let result = file.inject_from(
        ImageKind::IniImage,
        &dir.path().join("absent.ini"),
        TailPolicy::LeaveStale,
    );
    assert!(matches!(result, Err(ToolError::Open { .. })));
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Injecting into one record leaves every byte outside it untouched on disk
    #[test]
    fn inject_on_disk_preserves_neighbours(
        target in 0usize..5,
        fraction in 0.0f64..=1.0,
        fill in any::<u8>(),
        zero_fill in any::<bool>()
    ) {
        let dir = TempDir::new().unwrap();
        let (path, layout) = write_full_container(dir.path());
        let before = std::fs::read(&path).unwrap();

        let (kind, offset, capacity) = layout[target];
        let len = (f64::from(capacity) * fraction) as usize;
        let payload = vec![fill; len];
        let tail = if zero_fill { TailPolicy::ZeroFill } else { TailPolicy::LeaveStale };

        let mut file = ContainerFile::open(&path).unwrap();
        file.inject(kind, &payload, tail).unwrap();

        let after = std::fs::read(&path).unwrap();
        let end = offset + HEADER_SIZE + capacity as usize;
        prop_assert_eq!(after.len(), before.len());
        prop_assert_eq!(&after[..offset], &before[..offset]);
        prop_assert_eq!(&after[end..], &before[end..]);

        let out = dir.path().join("out.bin");
        file.extract_to(kind, &out).unwrap();
        prop_assert_eq!(std::fs::read(&out).unwrap(), payload);
    }
}
