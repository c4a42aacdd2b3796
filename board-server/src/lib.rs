//! Roomboard Edge Server - hotel housekeeping board backend
//!
//! # Architecture
//!
//! - **Room lifecycle core** (`rooms`): status derivation, role-gated
//!   transitions, filter/sort for role views
//! - **Database** (`db`): embedded SurrealDB storage and repositories
//! - **Live sync** (`rooms::watcher`): LIVE query subscription republishing
//!   derived room summaries to all connected clients
//! - **Auth** (`auth`): JWT + Argon2
//! - **HTTP API** (`api`): one route per room transition plus list/stream
//!
//! # Module layout
//!
//! ```text
//! board-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT service, extractor
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # models, repositories, seeding
//! ├── message/       # broadcast bus
//! ├── rooms/         # lifecycle core (status, transitions, view, watcher)
//! └── utils/         # errors, logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod message;
pub mod rooms;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use message::MessageBus;
pub use rooms::{derive_display_status, FilterMode, RoomSummary};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Structured security event logging (auth failures, permission denials).
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ____                        __                         __
   / __ \____  ____  ____ ___  / /_  ____  ____ __________/ /
  / /_/ / __ \/ __ \/ __ `__ \/ __ \/ __ \/ __ `/ ___/ __  /
 / _, _/ /_/ / /_/ / / / / / / /_/ / /_/ / /_/ / /  / /_/ /
/_/ |_|\____/\____/_/ /_/ /_/_.___/\____/\__,_/_/   \__,_/
    "#
    );
}
