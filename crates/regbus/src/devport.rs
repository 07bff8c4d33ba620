use crate::{PortIo, Result, TransportError};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

/// Port I/O through the Linux `/dev/port` character device (needs CAP_SYS_RAWIO).
pub struct DevPort {
    path: PathBuf,
    file: File,
}

impl DevPort {
    pub const DEFAULT_PATH: &'static str = "/dev/port";

    pub fn open() -> Result<Self> {
        Self::open_path(Self::DEFAULT_PATH)
    }

    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| TransportError::Io(format!("{}: {e}", path.display())))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PortIo for DevPort {
    fn inb(&self, port: u16) -> Result<u8> {
        let mut buf = [0u8; 1];
        let n = self
            .file
            .read_at(&mut buf, u64::from(port))
            .map_err(|e| TransportError::Io(e.to_string()))?;
        if n != 1 {
            return Err(TransportError::Io(format!("short read at port 0x{port:04X}")));
        }
        Ok(buf[0])
    }

    fn outb(&self, port: u16, value: u8) -> Result<()> {
        let n = self
            .file
            .write_at(&[value], u64::from(port))
            .map_err(|e| TransportError::Io(e.to_string()))?;
        if n != 1 {
            return Err(TransportError::Io(format!("short write at port 0x{port:04X}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positioned_io_on_plain_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.as_file().set_len(0x300).unwrap();
        let port = DevPort::open_path(tmp.path()).unwrap();

        port.outb(0x295, 0x58).unwrap();
        assert_eq!(port.inb(0x295).unwrap(), 0x58);
        assert_eq!(port.inb(0x296).unwrap(), 0x00);
        assert!(port.inb(0x400).is_err());
    }

    #[test]
    fn missing_device_is_io_error() {
        assert!(matches!(
            DevPort::open_path("/nonexistent/port"),
            Err(TransportError::Io(_))
        ));
    }
}
