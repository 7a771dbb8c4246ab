pub mod catalog;
pub mod table;

pub use table::{
    Availability, AvailabilityPolicy, Fallbacks, Resolution, RouteEntry, RouteTable, Visibility,
};
