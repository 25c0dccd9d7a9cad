//! Report endpoints.
//!
//! An endpoint produces its content anew whenever it is shown.
//! Endpoints are registered under a name with a [`Registry`] and removed
//! again on teardown.

use std::{collections::BTreeMap, io::Write};

use crate::{
    error::{Error, Result},
    provider::RegisterProvider,
    report::generate_report,
};

/// Readable endpoint.
pub trait Endpoint {
    /// Writes the current content to `out`.
    fn show(&self, out: &mut dyn Write) -> Result<()>;
}

/// GPIO register report endpoint.
///
/// The register space is acquired for every request and released
/// once the report has been written.
#[derive(Debug, Clone)]
pub struct GpioReport<P> {
    provider: P,
}

impl<P: RegisterProvider> GpioReport<P> {
    /// Creates the endpoint using the specified register space provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Register space provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: RegisterProvider> Endpoint for GpioReport<P> {
    fn show(&self, out: &mut dyn Write) -> Result<()> {
        let space = self.provider.acquire()?;
        for line in generate_report(&space) {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

/// Named endpoints.
#[derive(Default)]
pub struct Registry {
    endpoints: BTreeMap<String, Box<dyn Endpoint>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `endpoint` under `name`.
    pub fn register(&mut self, name: impl Into<String>, endpoint: impl Endpoint + 'static) -> Result<()> {
        let name = name.into();
        if self.endpoints.contains_key(&name) {
            return Err(Error::AlreadyRegistered(name));
        }

        log::info!("{name} registered");
        self.endpoints.insert(name, Box::new(endpoint));
        Ok(())
    }

    /// Removes the endpoint registered under `name`.
    pub fn unregister(&mut self, name: &str) -> Result<()> {
        match self.endpoints.remove(name) {
            Some(_) => {
                log::info!("{name} unregistered");
                Ok(())
            }
            None => Err(Error::NotRegistered(name.to_string())),
        }
    }

    /// Shows the endpoint registered under `name`.
    pub fn show(&self, name: &str, out: &mut dyn Write) -> Result<()> {
        let endpoint = self.endpoints.get(name).ok_or_else(|| Error::NotRegistered(name.to_string()))?;
        log::debug!("showing {name}");
        endpoint.show(out)
    }

    /// Names of registered endpoints in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::{RegisterImage, RegisterSpace};
    use std::cell::Cell;

    struct Greeting;

    impl Endpoint for Greeting {
        fn show(&self, out: &mut dyn Write) -> Result<()> {
            out.write_all(b"hello\n")?;
            Ok(())
        }
    }

    #[test]
    fn register_show_unregister() {
        let mut registry = Registry::new();
        registry.register("greeting", Greeting).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), ["greeting"]);

        let mut out: Vec<u8> = Vec::new();
        registry.show("greeting", &mut out).unwrap();
        assert_eq!(out, b"hello\n");

        registry.unregister("greeting").unwrap();
        assert_eq!(registry.names().count(), 0);
        assert!(matches!(registry.show("greeting", &mut out), Err(Error::NotRegistered(_))));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = Registry::new();
        registry.register("rpigpio", Greeting).unwrap();
        assert!(matches!(
            registry.register("rpigpio", GpioReport::new(RegisterImage::zeroed())),
            Err(Error::AlreadyRegistered(name)) if name == "rpigpio"
        ));
    }

    #[test]
    fn unregister_unknown() {
        assert!(matches!(Registry::new().unregister("rpigpio"), Err(Error::NotRegistered(_))));
    }

    #[test]
    fn report_has_line_per_pin() {
        let mut out: Vec<u8> = Vec::new();
        GpioReport::new(RegisterImage::zeroed()).show(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 54);
        assert!(text.ends_with("GPIO 53: Function: Input   Level: Low       Event: No event\n"));
    }

    /// Provider that counts acquisitions and releases.
    struct Counting<'a> {
        acquired: &'a Cell<usize>,
        released: &'a Cell<usize>,
    }

    struct Counted<'a> {
        image: RegisterImage,
        released: &'a Cell<usize>,
    }

    impl RegisterSpace for Counted<'_> {
        fn word(&self, offset: usize) -> u32 {
            self.image.word(offset)
        }
    }

    impl Drop for Counted<'_> {
        fn drop(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    impl<'a> RegisterProvider for Counting<'a> {
        type Space = Counted<'a>;

        fn acquire(&self) -> Result<Counted<'a>> {
            self.acquired.set(self.acquired.get() + 1);
            Ok(Counted { image: RegisterImage::zeroed(), released: self.released })
        }
    }

    /// Sink failing after the first write.
    struct Broken(bool);

    impl Write for Broken {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if std::mem::replace(&mut self.0, true) {
                Err(std::io::ErrorKind::BrokenPipe.into())
            } else {
                Ok(buf.len())
            }
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn register_space_released_per_request() {
        let (acquired, released) = (Cell::new(0), Cell::new(0));
        let report = GpioReport::new(Counting { acquired: &acquired, released: &released });

        report.show(&mut std::io::sink()).unwrap();
        report.show(&mut std::io::sink()).unwrap();
        assert_eq!((acquired.get(), released.get()), (2, 2));

        assert!(matches!(report.show(&mut Broken(false)), Err(Error::Io(_))));
        assert_eq!((acquired.get(), released.get()), (3, 3));
    }
}
