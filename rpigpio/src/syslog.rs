//! Syslog.

use log::{Level, Metadata, Record};
use std::ffi::{CString, NulError};

/// Forwards log records to the system logger.
pub struct Syslog {
    _ident: CString,
}

impl Syslog {
    /// Opens the system logger with the specified program identifier.
    pub fn new(ident: &str) -> Result<Self, NulError> {
        let ident = CString::new(ident)?;
        unsafe { libc::openlog(ident.as_ptr(), libc::LOG_PID | libc::LOG_CONS, libc::LOG_USER) };

        Ok(Self { _ident: ident })
    }

    /// Message text with interior NULs replaced.
    fn message(record: &Record) -> Result<CString, NulError> {
        CString::new(record.args().to_string().replace('\0', "\u{fffd}"))
    }

    fn priority(level: Level) -> libc::c_int {
        match level {
            Level::Error => libc::LOG_ERR,
            Level::Warn => libc::LOG_WARNING,
            Level::Info => libc::LOG_INFO,
            Level::Debug | Level::Trace => libc::LOG_DEBUG,
        }
    }
}

impl log::Log for Syslog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let Ok(cmsg) = Self::message(record) else { return };
        let priority = Self::priority(record.level()) | libc::LOG_USER;
        unsafe { libc::syslog(priority, b"%s\0".as_ptr() as *const _, cmsg.as_ptr()) }
    }

    fn flush(&self) {}
}

impl Drop for Syslog {
    fn drop(&mut self) {
        unsafe { libc::closelog() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priorities() {
        assert_eq!(Syslog::priority(Level::Error), libc::LOG_ERR);
        assert_eq!(Syslog::priority(Level::Warn), libc::LOG_WARNING);
        assert_eq!(Syslog::priority(Level::Info), libc::LOG_INFO);
        assert_eq!(Syslog::priority(Level::Debug), libc::LOG_DEBUG);
        assert_eq!(Syslog::priority(Level::Trace), libc::LOG_DEBUG);
    }

    #[test]
    fn interior_nul_is_replaced() {
        let msg = Syslog::message(&Record::builder().args(format_args!("GPIO\0 14")).build()).unwrap();
        assert_eq!(msg.to_str().unwrap(), "GPIO\u{fffd} 14");
    }
}
