//! Domain models
//!
//! Entities persisted by the server plus their create/update payloads.

mod booking;
mod menu_item;
mod points;
mod venue;
mod wallet;

pub use booking::{Booking, BookingCreate, BookingStatus};
pub use menu_item::{MenuItem, MenuItemAmend, MenuItemCreate};
pub use points::{PointsAward, PointsRecord};
pub use venue::{Venue, VenueCreate};
pub use wallet::{TipShare, Wallet, WalletEntry, WalletEntryKind, WalletKind};
