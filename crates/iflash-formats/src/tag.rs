//! Known sub-image kinds and their 16-byte signatures

use crate::error::IflashError;
use std::fmt;
use std::str::FromStr;

/// Length of every record signature in bytes
pub const SIGNATURE_LENGTH: usize = 16;

/// Sub-image kinds carried by an InsydeFlash update container
///
/// Each kind is identified inside the container by a fixed ASCII signature
/// placed at the start of its record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageKind {
    /// Main BIOS flash descriptor image (`$_IFLASH_BIOSIMG`)
    BiosImage,
    /// Platform configuration INI file (`$_IFLASH_INI_IMG`)
    IniImage,
    /// Embedded controller firmware (`$_IFLASH_EC_IMG_`)
    EcImage,
    /// Driver image used by the flash utility (`$_IFLASH_DRV_IMG`)
    DriverImage,
    /// BIOS signing certificate (`$_IFLASH_BIOSCER`)
    Certificate,
}

impl ImageKind {
    /// All known kinds, in the order the extractor walks them
    pub const ALL: [Self; 5] = [
        Self::BiosImage,
        Self::IniImage,
        Self::EcImage,
        Self::Certificate,
        Self::DriverImage,
    ];

    /// The exact signature bytes for this kind
    pub const fn signature(self) -> &'static [u8; SIGNATURE_LENGTH] {
        match self {
            Self::BiosImage => b"$_IFLASH_BIOSIMG",
            Self::IniImage => b"$_IFLASH_INI_IMG",
            Self::EcImage => b"$_IFLASH_EC_IMG_",
            Self::DriverImage => b"$_IFLASH_DRV_IMG",
            Self::Certificate => b"$_IFLASH_BIOSCER",
        }
    }

    /// Identify a kind from signature bytes (exact, case-sensitive match)
    pub fn from_signature(bytes: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.signature().as_slice() == bytes)
    }

    /// Conventional file name for the extracted payload
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::BiosImage => "BIOSFILE.FD",
            Self::IniImage => "platforms.ini",
            Self::EcImage => "EC.BIN",
            Self::DriverImage => "drv_img.bin",
            Self::Certificate => "CERT.pem",
        }
    }

    /// Short name used on the command line
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::BiosImage => "bios",
            Self::IniImage => "ini",
            Self::EcImage => "ec",
            Self::DriverImage => "drv",
            Self::Certificate => "cert",
        }
    }

    /// Signature rendered as text; every signature is plain ASCII
    pub fn signature_str(self) -> &'static str {
        std::str::from_utf8(self.signature()).unwrap_or("<non-ascii>")
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signature_str())
    }
}

impl FromStr for ImageKind {
    type Err = IflashError;

    /// Accepts either the short name (`ini`) or the full signature text
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.short_name().eq_ignore_ascii_case(s))
            .or_else(|| Self::from_signature(s.as_bytes()))
            .ok_or_else(|| IflashError::InvalidArgument(format!("unknown image kind '{s}'")))
    }
}
