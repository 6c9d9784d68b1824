pub mod cli_consts {
    //! Dashboard Configuration Constants
    //!
    //! This module contains the configuration constants for the dashboard client,
    //! organized by functional area.

    // =============================================================================
    // QUEUE CONFIGURATION
    // =============================================================================

    /// Maximum number of notifications kept on screen at once.
    pub const MAX_NOTIFICATIONS: usize = 20;

    /// Buffer size of the dashboard event channel.
    pub const EVENT_QUEUE_SIZE: usize = 100;

    // =============================================================================
    // FILTER CONFIGURATION
    // =============================================================================

    /// Date range presets offered to the user (trailing days).
    pub mod presets {
        /// Preset selected when the dashboard first loads.
        pub const DEFAULT_DAYS: u32 = 30;

        /// Window used by the unauthenticated landing view.
        pub const PUBLIC_DAYS: u32 = 30;
    }

    // =============================================================================
    // VIEW CONFIGURATION
    // =============================================================================

    pub mod views {
        use std::time::Duration;

        /// Columns of the tip table shown to members.
        pub const MEMBER_COLUMNS: usize = 8;

        /// Columns of the tip table shown to managers (adds the owner column).
        pub const MANAGER_COLUMNS: usize = 9;

        /// Notifications are dismissed automatically after this many milliseconds.
        pub const NOTIFICATION_TTL_MS: u64 = 5_000;

        pub const fn notification_ttl() -> Duration {
            Duration::from_millis(NOTIFICATION_TTL_MS)
        }
    }

    // =============================================================================
    // NETWORK CONFIGURATION
    // =============================================================================

    pub mod network {
        use std::time::Duration;

        /// Connection establishment timeout (seconds)
        pub const CONNECT_TIMEOUT_SECS: u64 = 10;

        /// Whole-request timeout (seconds)
        pub const REQUEST_TIMEOUT_SECS: u64 = 30;

        pub const fn connect_timeout() -> Duration {
            Duration::from_secs(CONNECT_TIMEOUT_SECS)
        }

        pub const fn request_timeout() -> Duration {
            Duration::from_secs(REQUEST_TIMEOUT_SECS)
        }
    }

    /// Backend endpoints, relative to the base URL.
    pub mod endpoints {
        pub const BREAKDOWN: &str = "api/stats/breakdown";
        pub const DAILY: &str = "api/stats/daily";
        pub const WEEKDAY: &str = "api/stats/weekday";
        pub const TIPS: &str = "api/tips";
        pub const USER_ROLE: &str = "api/user/role";
        pub const AUTH_SESSION: &str = "auth/session";
        pub const AUTH_USER: &str = "auth/user";
        pub const AUTH_LOGOUT: &str = "auth/logout";
    }
}
