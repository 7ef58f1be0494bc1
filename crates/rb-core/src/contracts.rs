//! Names shared between the session orchestrator, the reels, and the UI.

/// Start button name carried by `OnBtn`
pub const START_BUTTON: &str = "Start";
/// Stop button name carried by `OnBtn`
pub const STOP_BUTTON: &str = "Stop";

/// Model field: start button interactable
pub const START_ENABLE_FIELD: &str = "BtnStartEnable";
/// Model field: stop button interactable
pub const STOP_ENABLE_FIELD: &str = "BtnStopEnable";
/// Model field: resolved reel count
pub const REELS_COUNT_FIELD: &str = "SlotReelsCount";
/// Model field: reels not yet confirmed stopped
pub const PENDING_STOPS_FIELD: &str = "SlotPendingStops";

/// Broadcast to every reel when a spin begins
pub const EVENT_START_SPIN: &str = "SlotStartSpin";
/// Broadcast to every reel when the player commits a stop
pub const EVENT_STOP_SPIN: &str = "SlotStopSpin";
/// Published by a reel once its snap has settled
pub const EVENT_VISUAL_STOPPED: &str = "SlotVisualStopped";
/// Button press, single argument: the button name
pub const EVENT_BUTTON: &str = "OnBtn";

/// Event published when a model field changes value
pub fn field_changed_event(field: &str) -> String {
    format!("On{field}Changed")
}

/// Default enable field for a button name
pub fn button_enable_field(button: &str) -> String {
    format!("Btn{button}Enable")
}
