//! # Events Module
//!
//! Event-driven architecture for GUI-ready progress reporting.
//!
//! ## Design
//! The core library emits events through channels, allowing any UI
//! (CLI, GUI, web) to subscribe and display progress. Senders never
//! block the operation: a dropped receiver turns sends into no-ops.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! // In a separate thread, listen for events
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Scan(ScanEvent::Progress(p)) => {
//!                 println!("Scanned {}/{}", p.processed, p.total)
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//!
//! // Run the scan with the sender
//! scanner.scan_with_events(&root, &catalog, &sender, &token)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
