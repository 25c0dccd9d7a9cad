//! Register space providers.

use nix::sys::mman::{mmap, munmap, MapFlags, ProtFlags};
use std::{
    ffi::c_void,
    fs::{self, OpenOptions},
    io,
    num::NonZeroUsize,
    os::unix::fs::OpenOptionsExt,
    path::{Path, PathBuf},
    ptr,
};

use crate::{
    error::{Error, Result},
    regs::{check_offset, RegisterImage, RegisterSpace, GPIO_BASE, REGISTER_SPACE_SIZE},
};

const MAP_LEN: NonZeroUsize = match NonZeroUsize::new(REGISTER_SPACE_SIZE) {
    Some(len) => len,
    None => panic!("register space is empty"),
};

/// Source of the register space.
pub trait RegisterProvider {
    /// Register space handed out by [`acquire`](Self::acquire).
    ///
    /// It is released when dropped.
    type Space: RegisterSpace;

    /// Acquires the register space for the duration of one report.
    fn acquire(&self) -> Result<Self::Space>;
}

impl<P: RegisterProvider + ?Sized> RegisterProvider for &P {
    type Space = P::Space;

    fn acquire(&self) -> Result<P::Space> {
        (**self).acquire()
    }
}

/// Memory mapping of the GPIO controller through a memory device.
#[derive(Debug, Clone)]
pub struct GpioMem {
    path: PathBuf,
    offset: u64,
}

impl GpioMem {
    /// GPIO-only memory device, mapped at offset zero.
    pub const GPIOMEM: &'static str = "/dev/gpiomem";

    /// Physical memory device, mapped at [`GPIO_BASE`].
    pub const MEM: &'static str = "/dev/mem";

    /// Maps `offset` of the memory device at `path`.
    ///
    /// The offset must be page aligned.
    pub fn new(path: impl Into<PathBuf>, offset: u64) -> Self {
        Self { path: path.into(), offset }
    }

    /// Uses `/dev/gpiomem`, which needs no root privileges.
    pub fn gpiomem() -> Self {
        Self::new(Self::GPIOMEM, 0)
    }

    /// Uses `/dev/mem` at the physical GPIO base address.
    pub fn mem() -> Self {
        Self::new(Self::MEM, GPIO_BASE)
    }

    /// Memory device path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, source: io::Error) -> Error {
        Error::ResourceUnavailable { path: self.path.clone(), source }
    }
}

impl Default for GpioMem {
    fn default() -> Self {
        Self::gpiomem()
    }
}

impl RegisterProvider for GpioMem {
    type Space = Mapping;

    fn acquire(&self) -> Result<Mapping> {
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_SYNC)
            .open(&self.path)
            .map_err(|err| self.unavailable(err))?;

        // Device files report no length; a regular file must cover the whole mapping.
        let metadata = file.metadata().map_err(|err| self.unavailable(err))?;
        let end = self.offset.saturating_add(REGISTER_SPACE_SIZE as u64);
        if metadata.is_file() && metadata.len() < end {
            return Err(self.unavailable(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file has {} bytes but mapping ends at 0x{end:x}", metadata.len()),
            )));
        }

        let offset = libc::off_t::try_from(self.offset).map_err(|_| {
            self.unavailable(io::Error::new(io::ErrorKind::InvalidInput, "offset exceeds off_t"))
        })?;
        let base = unsafe { mmap(None, MAP_LEN, ProtFlags::PROT_READ, MapFlags::MAP_SHARED, Some(&file), offset) }
            .map_err(|errno| self.unavailable(errno.into()))?;

        log::debug!("mapped {} bytes of {} at 0x{:x}", REGISTER_SPACE_SIZE, self.path.display(), self.offset);
        Ok(Mapping { base, path: self.path.clone() })
    }
}

/// Mapped register space.
///
/// The mapping outlives the file it was created from and is unmapped
/// when dropped.
#[derive(Debug)]
pub struct Mapping {
    base: *mut c_void,
    path: PathBuf,
}

impl RegisterSpace for Mapping {
    #[track_caller]
    fn word(&self, offset: usize) -> u32 {
        check_offset(offset);
        // SAFETY: offset is word aligned and within the mapped length.
        let value = unsafe { ptr::read_volatile(self.base.cast::<u8>().add(offset).cast::<u32>()) };
        u32::from_le(value)
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        match unsafe { munmap(self.base, REGISTER_SPACE_SIZE) } {
            Ok(()) => log::debug!("unmapped {}", self.path.display()),
            Err(err) => log::error!("cannot unmap {}: {err}", self.path.display()),
        }
    }
}

/// Register image stored in a file.
#[derive(Debug, Clone)]
pub struct ImageFile {
    path: PathBuf,
}

impl ImageFile {
    /// Reads the image from `path` on every acquisition.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Image file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegisterProvider for ImageFile {
    type Space = RegisterImage;

    fn acquire(&self) -> Result<RegisterImage> {
        let unavailable = |source: io::Error| Error::ResourceUnavailable { path: self.path.clone(), source };

        let data = fs::read(&self.path).map_err(unavailable)?;
        let image = RegisterImage::from_bytes(&data).ok_or_else(|| {
            unavailable(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected {REGISTER_SPACE_SIZE} bytes but found {}", data.len()),
            ))
        })?;

        log::debug!("read register image from {}", self.path.display());
        Ok(image)
    }
}

impl RegisterProvider for RegisterImage {
    type Space = RegisterImage;

    fn acquire(&self) -> Result<RegisterImage> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::GPLEV0;
    use std::io::Write;

    #[test]
    fn default_devices() {
        assert_eq!(GpioMem::default().path(), Path::new("/dev/gpiomem"));
        let mem = GpioMem::mem();
        assert_eq!(mem.path(), Path::new("/dev/mem"));
        assert_eq!(mem.offset, 0x2020_0000);
    }

    #[test]
    fn missing_device_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gpiomem");
        match GpioMem::new(&path, 0).acquire() {
            Err(Error::ResourceUnavailable { path: p, source }) => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn mapped_file_reads_words() {
        let mut image = RegisterImage::zeroed();
        image.set_word(GPLEV0, 0x8000_0001);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(image.as_bytes()).unwrap();
        file.flush().unwrap();

        let mapping = GpioMem::new(file.path(), 0).acquire().unwrap();
        assert_eq!(mapping.word(GPLEV0), 0x8000_0001);
        assert_eq!(RegisterImage::capture(&mapping), image);
    }

    #[test]
    fn short_file_is_unavailable() {
        for len in [0, 16, REGISTER_SPACE_SIZE - 4] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(&vec![0; len]).unwrap();
            file.flush().unwrap();

            match GpioMem::new(file.path(), 0).acquire() {
                Err(Error::ResourceUnavailable { source, .. }) => {
                    assert_eq!(source.kind(), io::ErrorKind::InvalidData, "{len} bytes")
                }
                other => panic!("{len} bytes: unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn image_file_round_trip() {
        let mut image = RegisterImage::zeroed();
        image.set_word(0, 0b111);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(image.as_bytes()).unwrap();
        file.flush().unwrap();

        assert_eq!(ImageFile::new(file.path()).acquire().unwrap(), image);
    }

    #[test]
    fn truncated_image_is_unavailable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0; 16]).unwrap();
        file.flush().unwrap();

        match ImageFile::new(file.path()).acquire() {
            Err(Error::ResourceUnavailable { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::InvalidData)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
