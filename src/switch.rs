/// Digital limit-switch input.
///
/// Home switches are wired normally-closed, so the electrical level reads
/// `0` while the switch is pressed and non-zero once it opens. Callers that
/// care about the "triggered" condition must compare against 0, not 1.
pub trait LimitSwitch: Send + Sync {
    /// Current raw input level.
    fn level(&self) -> u8;
}
