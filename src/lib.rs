//! # Filedrop
//!
//! A small LAN file exchange server, usable both as a standalone binary and
//! as a library.
//!
//! Files live in two namespaces ("client" and "server"), each backed by a
//! plain directory. The general service lets anyone on the network upload,
//! list, download, preview and delete files; a second, separately-bound
//! admin service exposes edit/delete over the server namespace only.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use filedrop::server::{AppState, general_router, admin_router};
//! use filedrop::storage::FileStore;
//!
//! let store = FileStore::new(PathBuf::from("./data"));
//! store.ensure_roots().await.unwrap();
//!
//! let state = Arc::new(AppState::new(store));
//! let app = general_router(state.clone());
//! let admin = admin_router(state);
//! // Serve each with axum...
//! ```

pub mod config;
pub mod error;
pub mod netif;
pub mod server;
pub mod storage;
