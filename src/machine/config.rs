//! Machine configuration.

/// Default number of committed transitions kept in the history.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Settings applied when a machine is constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    /// Initial value of the dispatch switch.
    pub enabled: bool,

    /// Maximum number of transition records retained. Zero disables history.
    pub history_limit: usize,

    /// Drop the handlers scoped to a key when a state re-registered under
    /// that key displaces an earlier one. Off by default: a replacement
    /// only overwrites the handlers it subscribes again.
    pub clear_replaced_handlers: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            clear_replaced_handlers: false,
        }
    }
}
