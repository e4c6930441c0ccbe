/// A capture device that has been opened and can be polled for payloads.
pub trait CaptureSource<P>: Send {
    /// Produces one payload, or `None` when the device has nothing to hand
    /// over yet (not initialized, no new data). `None` is not an error.
    fn capture(&mut self) -> Option<P>;
}

impl<P> CaptureSource<P> for Box<dyn CaptureSource<P>> {
    fn capture(&mut self) -> Option<P> {
        (**self).capture()
    }
}

/// Something that can be opened into a fresh [`CaptureSource`] each time a
/// signal is switched on.
pub trait CaptureDevice<P>: Send {
    fn open(&mut self) -> anyhow::Result<Box<dyn CaptureSource<P>>>;
}

impl<P> CaptureDevice<P> for Box<dyn CaptureDevice<P>> {
    fn open(&mut self) -> anyhow::Result<Box<dyn CaptureSource<P>>> {
        (**self).open()
    }
}
