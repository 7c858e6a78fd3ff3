//! Shared constants for the application

use deskmon_types::Point;
use std::time::Duration;

/// Wait between sensor poll iterations
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Consecutive read failures that trigger a backend close/reopen
pub const MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Refresh cadence once data is flowing (also after an error snapshot)
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(2000);

/// Refresh cadence while no poll has completed yet
pub const REFRESH_WAITING_INTERVAL: Duration = Duration::from_millis(500);

/// Delay before the first embed attempt and before each re-embed
pub const EMBED_DELAY: Duration = Duration::from_millis(100);

/// Virtual-screen geometry poll cadence
pub const GEOMETRY_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Horizontal distance covered by one slide animation tick
pub const PEEK_STEP_PX: i32 = 20;

/// Slide animation frame interval
pub const PEEK_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// How often a revealed widget re-checks the cursor
pub const PEEK_REVEAL_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Width of the hover strip on the right screen edge
pub const TRIGGER_WIDTH_PX: i32 = 2;

/// Minimum time between two alert beeps
pub const ALERT_COOLDOWN: Duration = Duration::from_secs(60);

/// How long an alert message keeps the status line
pub const ALERT_STATUS_HOLD: Duration = Duration::from_secs(10);

/// Position used when nothing valid is stored
pub const DEFAULT_POSITION: Point = Point { x: 50, y: 50 };

/// Event pump timeout when nothing is scheduled
pub const IDLE_PUMP_TIMEOUT: Duration = Duration::from_millis(250);
