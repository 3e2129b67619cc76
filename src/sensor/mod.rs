pub mod wifi;

pub use wifi::{Wifi, WifiFactory, WirelessStats};
