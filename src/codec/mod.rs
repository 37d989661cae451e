pub mod bitbuster;
pub mod dan1;
pub mod dan3;
pub mod lzf;
pub mod mdkrle;
pub mod pletter;
pub mod zx0;
pub mod zx7;

use crate::error::{Error, Result};

/// Common surface of the eight codec units.
///
/// `compress` and `decompress` are pure slice-to-vec transforms; work
/// buffers live for the duration of one call. A codec value is reentrant
/// but must not be shared across concurrently running calls.
pub trait Codec {
    fn name(&self) -> &'static str;

    /// Largest accepted input, if the format bounds it.
    fn max_input(&self) -> Option<usize> {
        None
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>>;

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>>;
}

/// Reject inputs beyond a codec's declared maximum.
pub(crate) fn check_input_size(size: usize, max: usize) -> Result<()> {
    if size > max {
        return Err(Error::InputTooLarge { size, max });
    }
    Ok(())
}

/// Identity of each supported codec, used for dispatch and for mapping
/// file extensions in the CLI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CodecKind {
    MdkRle,
    Lzf,
    Pletter,
    Dan1,
    Dan3,
    Zx7,
    Zx0,
    BitBuster,
}

impl CodecKind {
    pub const ALL: [CodecKind; 8] = [
        CodecKind::MdkRle,
        CodecKind::Lzf,
        CodecKind::Pletter,
        CodecKind::Dan1,
        CodecKind::Dan3,
        CodecKind::Zx7,
        CodecKind::Zx0,
        CodecKind::BitBuster,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CodecKind::MdkRle => "mdk-rle",
            CodecKind::Lzf => "lzf",
            CodecKind::Pletter => "pletter",
            CodecKind::Dan1 => "dan1",
            CodecKind::Dan3 => "dan3",
            CodecKind::Zx7 => "zx7",
            CodecKind::Zx0 => "zx0",
            CodecKind::BitBuster => "bitbuster",
        }
    }

    /// Map a file extension (without the dot, case-insensitive) to a codec.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mdkrle" | "mdk" | "rle" => Some(CodecKind::MdkRle),
            "lzf" => Some(CodecKind::Lzf),
            "plet5" => Some(CodecKind::Pletter),
            "dan1" => Some(CodecKind::Dan1),
            "dan3" => Some(CodecKind::Dan3),
            "pck" => Some(CodecKind::BitBuster),
            "zx7" => Some(CodecKind::Zx7),
            "zx0" => Some(CodecKind::Zx0),
            _ => None,
        }
    }

    /// Preferred file extension for compressed output.
    pub fn extension(self) -> &'static str {
        match self {
            CodecKind::MdkRle => "mdk",
            CodecKind::Lzf => "lzf",
            CodecKind::Pletter => "plet5",
            CodecKind::Dan1 => "dan1",
            CodecKind::Dan3 => "dan3",
            CodecKind::Zx7 => "zx7",
            CodecKind::Zx0 => "zx0",
            CodecKind::BitBuster => "pck",
        }
    }

    /// Construct the codec with default options.
    pub fn codec(self) -> Box<dyn Codec + Send + Sync> {
        match self {
            CodecKind::MdkRle => Box::new(mdkrle::MdkRle),
            CodecKind::Lzf => Box::new(lzf::Lzf),
            CodecKind::Pletter => Box::new(pletter::Pletter::default()),
            CodecKind::Dan1 => Box::new(dan1::Dan1::default()),
            CodecKind::Dan3 => Box::new(dan3::Dan3::default()),
            CodecKind::Zx7 => Box::new(zx7::Zx7),
            CodecKind::Zx0 => Box::new(zx0::Zx0::default()),
            CodecKind::BitBuster => Box::new(bitbuster::BitBuster::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping_is_case_insensitive() {
        assert_eq!(CodecKind::from_extension("ZX0"), Some(CodecKind::Zx0));
        assert_eq!(CodecKind::from_extension("Plet5"), Some(CodecKind::Pletter));
        assert_eq!(CodecKind::from_extension("MDKRLE"), Some(CodecKind::MdkRle));
        assert_eq!(CodecKind::from_extension("bin"), None);
    }

    #[test]
    fn test_every_kind_resolves_its_own_extension() {
        for kind in CodecKind::ALL {
            assert_eq!(CodecKind::from_extension(kind.extension()), Some(kind));
        }
    }

    #[test]
    fn test_input_size_guard() {
        assert!(check_input_size(10, 10).is_ok());
        assert!(matches!(
            check_input_size(11, 10),
            Err(Error::InputTooLarge { size: 11, max: 10 })
        ));
    }
}
