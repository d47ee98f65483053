//! Which control last produced user input.

/// Last-writer-wins hint for the UI layer.
///
/// Written as a side effect by the switch poll and the channel edges,
/// overwritten rather than queued. It is not a lock: it only tells a
/// consumer what to render or act on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Focus {
    /// No input since construction.
    #[default]
    None,
    /// Switch pressed or released.
    Switch,
    /// Knob turned.
    Encoder,
    /// Switch held past the reset threshold.
    SwitchReset,
}
