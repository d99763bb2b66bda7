/// Receives decoded MIDI messages, one complete message per call. Typically this writes to a MIDI
/// output port.
///
/// Any `FnMut(&[u8])` closure is a sink:
///
/// ```
/// use smf_player::EventSink;
///
/// let mut count = 0;
/// let mut sink = |_message: &[u8]| count += 1;
/// sink.deliver(&[0x90, 0x40, 0x7f]);
/// drop(sink);
/// assert_eq!(1, count);
/// ```
pub trait EventSink {
    /// Called with one complete message: a status byte and its data bytes, or a whole system
    /// exclusive message.
    fn deliver(&mut self, message: &[u8]);
}

impl<F> EventSink for F
where
    F: FnMut(&[u8]),
{
    fn deliver(&mut self, message: &[u8]) {
        self(message)
    }
}
